//! Emitter
//!
//! Renders a [`Layout`] as the text surrounding a compiled template body: the
//! header runs from the generated-code notice to the opening brace of the
//! function, the footer closes it.

use std::io::Write;

use jadegen_domain::Layout;
use minijinja::{Environment, context};
use thiserror::Error;

/// Header template: notice, package clause, imports, definitions, signature.
pub const FILE_BEGIN: &str = r#"// Code generated by "jadegen"; DO NOT EDIT.

package {{ package }}

import (
{%- for line in imports %}
	{{ line }}
{%- endfor %}
)

{%- for block in defs %}
	{{ block }}
{%- endfor %}

{{ func }} {
	{{ before }}
"#;

/// Footer template: trailing code and the closing brace.
pub const FILE_END: &str = r"
	{{ after }}
}
";

/// Errors raised while rendering the file layout.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template engine failed to render.
    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    /// Writing the output failed.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.set_keep_trailing_newline(true);
    env.add_template("file_bgn", FILE_BEGIN)?;
    env.add_template("file_end", FILE_END)?;
    let template = env.get_template(name)?;
    Ok(template.render(ctx)?)
}

/// Writes the text around a compiled template body.
pub trait EmitLayout {
    /// Writes everything up to and including the function's opening brace
    /// and the code placed right after it.
    ///
    /// # Errors
    ///
    /// Returns an error if the header template fails to render or the writer
    /// fails.
    fn write_before<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), TemplateError>;

    /// Appends the code placed before the closing brace and the brace itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the footer template fails to render.
    fn write_after(&self, buffer: &mut Vec<u8>) -> Result<(), TemplateError>;
}

impl EmitLayout for Layout {
    fn write_before<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), TemplateError> {
        let header = render(
            "file_bgn",
            context! {
                package => &self.package,
                imports => &self.import,
                defs => &self.def,
                func => &self.func,
                before => &self.before,
            },
        )?;
        writer.write_all(header.as_bytes())?;
        Ok(())
    }

    fn write_after(&self, buffer: &mut Vec<u8>) -> Result<(), TemplateError> {
        let footer = render("file_end", context! { after => &self.after })?;
        buffer.extend_from_slice(footer.as_bytes());
        Ok(())
    }
}
