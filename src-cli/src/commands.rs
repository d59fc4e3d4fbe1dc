//! Command handlers for the docx-fill binary

use crate::settings::{AppSettings, SettingsManager};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use mail_merge::{
    load_batch_csv, load_template, FormInput, GeneratedDocument, MergeEngine, MergeOptions,
    MissingPlaceholderPolicy, TemplateInspection, TokenSyntax,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Placeholder syntax as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyntaxArg {
    /// `{{key}}`
    Double,
    /// `{key}`
    Single,
}

impl From<SyntaxArg> for TokenSyntax {
    fn from(arg: SyntaxArg) -> Self {
        match arg {
            SyntaxArg::Double => TokenSyntax::DoubleBrace,
            SyntaxArg::Single => TokenSyntax::SingleBrace,
        }
    }
}

/// Flags shared by commands that fill templates
#[derive(Debug, Clone, Default)]
pub struct MergeOverrides {
    pub syntax: Option<SyntaxArg>,
    pub strict: bool,
    pub no_headers: bool,
    pub no_escape: bool,
}

impl MergeOverrides {
    /// Apply command-line flags on top of the configured options
    pub fn apply(&self, mut options: MergeOptions) -> MergeOptions {
        if let Some(syntax) = self.syntax {
            options = options.with_syntax(syntax.into());
        }
        if self.strict {
            options = options.with_policy(MissingPlaceholderPolicy::Fail);
        }
        if self.no_headers {
            options = options.with_headers_footers(false);
        }
        if self.no_escape {
            options = options.with_escape_values(false);
        }
        options
    }
}

/// Where the form fields come from
#[derive(Debug, Clone)]
pub enum FormSource {
    Fields { name: String, roll_no: String, section: String },
    JsonFile(PathBuf),
}

impl FormSource {
    fn load(&self) -> Result<FormInput> {
        match self {
            FormSource::Fields { name, roll_no, section } => {
                Ok(FormInput::new(name.as_str(), roll_no.as_str(), section.as_str()))
            }
            FormSource::JsonFile(path) => FormInput::from_json_file(path)
                .with_context(|| format!("Failed to load form fields from {}", path.display())),
        }
    }
}

fn resolve_template(cli: Option<PathBuf>, settings: &AppSettings) -> Result<PathBuf> {
    match cli.or_else(|| settings.template_path.clone()) {
        Some(path) => Ok(path),
        None => bail!("No template given; pass --template or set template_path in the settings file"),
    }
}

fn write_document(doc: &GeneratedDocument, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(&doc.filename);
    store::write_package_bytes(&doc.bytes, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Fill the template once and write the result
pub fn generate(
    settings: &AppSettings,
    template: Option<PathBuf>,
    form: FormSource,
    out_dir: Option<PathBuf>,
    overrides: &MergeOverrides,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let template = resolve_template(template, settings)?;
    let out_dir = out_dir.unwrap_or_else(|| settings.output_dir.clone());
    let form = form.load()?;

    let engine = MergeEngine::new(overrides.apply(settings.merge.clone()));
    tracing::info!("Generating from {}", template.display());
    let doc = engine.generate_from_path(&template, &form)?;
    let path = write_document(&doc, &out_dir)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&doc.report)?)?;
    } else {
        writeln!(out, "{}", doc.report.summary())?;
        for diagnostic in &doc.report.diagnostics {
            writeln!(out, "  warning: {}", diagnostic.message)?;
        }
        writeln!(out, "Saved {}", path.display())?;
    }
    Ok(())
}

/// Show which placeholders a template contains
pub fn inspect(
    settings: &AppSettings,
    template: Option<PathBuf>,
    syntax: Option<SyntaxArg>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let template = resolve_template(template, settings)?;
    let mut options = settings.merge.clone();
    if let Some(syntax) = syntax {
        options = options.with_syntax(syntax.into());
    }

    let bytes = load_template(&template)?;
    let inspection = MergeEngine::new(options).inspect(&bytes)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&inspection)?)?;
    } else {
        print_inspection(&template, &inspection, out)?;
    }
    Ok(())
}

fn print_inspection(template: &Path, inspection: &TemplateInspection, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} ({} placeholders)", template.display(), inspection.token_syntax)?;
    for part in &inspection.parts {
        writeln!(out, "  {}", part.path)?;
        if part.tokens.is_empty() && part.split_tokens.is_empty() {
            writeln!(out, "    (none)")?;
        }
        for (key, count) in &part.tokens {
            writeln!(out, "    {} x{}", inspection.token_syntax.token(key), count)?;
        }
        for key in &part.split_tokens {
            writeln!(
                out,
                "    {} split by formatting, will not be replaced",
                inspection.token_syntax.token(key)
            )?;
        }
    }
    Ok(())
}

/// Fill the template once per CSV row
pub fn batch(
    settings: &AppSettings,
    template: Option<PathBuf>,
    data: &Path,
    out_dir: Option<PathBuf>,
    overrides: &MergeOverrides,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let template = resolve_template(template, settings)?;
    let out_dir = out_dir.unwrap_or_else(|| settings.output_dir.clone());
    let forms = load_batch_csv(data)
        .with_context(|| format!("Failed to read records from {}", data.display()))?;

    let bytes = load_template(&template)?;
    let engine = MergeEngine::new(overrides.apply(settings.merge.clone()));
    let result = engine.generate_batch(&bytes, &forms);

    for doc in &result.documents {
        write_document(doc, &out_dir)?;
    }

    if json {
        let reports: Vec<_> = result.documents.iter().map(|d| &d.report).collect();
        let output = serde_json::json!({
            "summary": result.summary,
            "documents": reports,
            "failures": result.failures,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        for failure in &result.failures {
            writeln!(
                out,
                "  record {}: {} ({})",
                failure.record_index + 1,
                failure.message,
                failure.kind.advice()
            )?;
        }
        writeln!(out, "{}", result.summary)?;
    }

    if !result.is_success() {
        bail!("{} of {} records failed", result.failures.len(), forms.len());
    }
    Ok(())
}

/// Write a settings file with default values
pub fn init_config(manager: &mut SettingsManager, force: bool) -> Result<()> {
    if manager.settings_path().exists() && !force {
        bail!(
            "{} already exists; use --force to overwrite",
            manager.settings_path().display()
        );
    }
    manager.update(AppSettings::default());
    manager.save()?;
    println!("Wrote {}", manager.settings_path().display());
    Ok(())
}
