//! Generate file use case.

use jadegen_domain::ident::is_identifier_tail;
use jadegen_domain::{CompiledUnit, DomainError, GeneratedFile, GeneratorSettings};
use tracing::debug;

use crate::emitter::EmitLayout;
use crate::error::{ApplicationError, ApplicationResult};
use crate::layout_builder::new_layout;
use crate::metadata::resolve_meta;
use crate::ports::SourceFormatter;

/// Use case turning one compiled template into a Go source file.
pub struct GenerateFile<F: SourceFormatter> {
    formatter: F,
    settings: GeneratorSettings,
}

impl<F: SourceFormatter> GenerateFile<F> {
    /// Creates a new `GenerateFile` use case.
    #[must_use]
    pub const fn new(formatter: F, settings: GeneratorSettings) -> Self {
        Self {
            formatter,
            settings,
        }
    }

    /// Returns the settings used for generation.
    #[must_use]
    pub const fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Generates the source file for `unit`.
    ///
    /// The header, the unit's body and the footer are concatenated. When
    /// import resolution is enabled the result goes through the formatter,
    /// otherwise it is only checked for syntax errors.
    ///
    /// # Errors
    /// - Returns error if the settings, seed or metadata are invalid
    /// - Returns error if the layout templates fail to render
    /// - Returns error if the generated source does not parse or cannot be formatted
    pub fn execute(&self, unit: CompiledUnit) -> ApplicationResult<GeneratedFile> {
        self.settings.validate()?;

        let CompiledUnit {
            seed,
            body,
            file_name,
            meta,
            legacy,
        } = unit;

        if !is_identifier_tail(&seed) {
            return Err(DomainError::InvalidIdentifier(seed).into());
        }

        let meta = resolve_meta(meta, legacy)?;
        let file_name = file_name.unwrap_or_else(|| self.settings.output_file_name(&seed));
        let layout = new_layout(&seed, &self.settings, meta);
        let function = function_name(&layout.func).to_string();

        let mut buffer = Vec::with_capacity(body.len() + 512);
        layout.write_before(&mut buffer)?;
        buffer.extend_from_slice(body.as_bytes());
        layout.write_after(&mut buffer)?;
        debug!(file = %file_name, bytes = buffer.len(), "rendered layout");

        let source = if self.settings.imports {
            let formatted = self
                .formatter
                .format(&file_name, &buffer, &self.settings.format_options)
                .map_err(|source| ApplicationError::Format {
                    file: file_name.clone(),
                    source,
                })?;
            debug!(file = %file_name, bytes = formatted.len(), "formatted source");
            String::from_utf8_lossy(&formatted).into_owned()
        } else {
            let source = String::from_utf8_lossy(&buffer).into_owned();
            self.formatter
                .check(&file_name, &source)
                .map_err(|source| ApplicationError::Format {
                    file: file_name.clone(),
                    source,
                })?;
            source
        };

        Ok(GeneratedFile::new(file_name, source, function))
    }
}

/// Name of the function declared by a `func name(...)` signature.
fn function_name(signature: &str) -> &str {
    let rest = signature.strip_prefix("func ").unwrap_or(signature);
    rest.split('(').next().unwrap_or(rest).trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::FormatError;
    use jadegen_domain::{FormatOptions, ImportSpec, Param, RawMeta, TemplateMeta};
    use pretty_assertions::assert_eq;

    /// Formatter double: rejects sources containing `@`, marks formatted output.
    pub(crate) struct FakeFormatter;

    impl SourceFormatter for FakeFormatter {
        fn check(&self, file_name: &str, source: &str) -> Result<(), FormatError> {
            if source.contains('@') {
                Err(FormatError::Syntax(format!("{file_name}: illegal character '@'")))
            } else {
                Ok(())
            }
        }

        fn format(
            &self,
            file_name: &str,
            source: &[u8],
            _options: &FormatOptions,
        ) -> Result<Vec<u8>, FormatError> {
            let text = String::from_utf8_lossy(source);
            self.check(file_name, &text)
                .map_err(|e| FormatError::Imports(e.to_string()))?;
            Ok(format!("// formatted\n{text}").into_bytes())
        }
    }

    fn use_case(imports: bool) -> GenerateFile<FakeFormatter> {
        let settings = GeneratorSettings {
            imports,
            ..GeneratorSettings::default()
        };
        GenerateFile::new(FakeFormatter, settings)
    }

    #[test]
    fn test_generate_with_formatter() {
        let file = use_case(true)
            .execute(CompiledUnit::new("index", "buffer.WriteString(\"hi\")"))
            .unwrap();
        assert_eq!(file.file_name, "index.jade.go");
        assert_eq!(file.function, "tpl_index");
        assert!(file.source.starts_with("// formatted\n// Code generated"));
        assert!(file.source.contains("buffer.WriteString(\"hi\")"));
    }

    #[test]
    fn test_generate_without_formatter_only_checks() {
        let file = use_case(false)
            .execute(CompiledUnit::new("index", ""))
            .unwrap();
        assert!(file.source.starts_with("// Code generated"));
        assert!(file.source.ends_with("}\n"));
    }

    #[test]
    fn test_generate_uses_metadata() {
        let meta = TemplateMeta::default()
            .with_name("Index")
            .with_param(Param::new("title", "string"))
            .with_import(ImportSpec::new("strings"));
        let mut unit = CompiledUnit::new("index", "").with_meta(meta);
        unit.file_name = Some("index.go".to_string());

        let file = use_case(false).execute(unit).unwrap();
        assert_eq!(file.file_name, "index.go");
        assert_eq!(file.function, "Index");
        assert!(file.source.contains("func Index(title string,buffer *pool.ByteBuffer) {"));
        assert!(file.source.contains("\t\"strings\"\n"));
    }

    #[test]
    fn test_generate_uses_legacy_metadata() {
        let mut unit = CompiledUnit::new("index", "");
        unit.legacy = Some(RawMeta {
            name: "Page".to_string(),
            args: "buffer *bytes.Buffer".to_string(),
            import: String::new(),
        });
        let file = use_case(false).execute(unit).unwrap();
        assert_eq!(file.function, "Page");
        assert!(file.source.contains("func Page(buffer *pool.ByteBuffer) {"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = use_case(false)
            .execute(CompiledUnit::new("index", "@"))
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Format {
                source: FormatError::Syntax(_),
                ..
            }
        ));
    }

    #[test]
    fn test_format_error_is_reported() {
        let err = use_case(true)
            .execute(CompiledUnit::new("index", "@"))
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Format {
                source: FormatError::Imports(_),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_seed() {
        let err = use_case(true)
            .execute(CompiledUnit::new("my-page", ""))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_invalid_package() {
        let generate = GenerateFile::new(FakeFormatter, GeneratorSettings::for_package("a-b"));
        let err = generate.execute(CompiledUnit::new("x", "")).unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidPackageName(_))));
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("func tpl_x(buffer *pool.ByteBuffer) "), "tpl_x");
        assert_eq!(function_name("func Index(a int,buffer *bytes.Buffer)"), "Index");
    }
}
