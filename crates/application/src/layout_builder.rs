//! Layout builder
//!
//! Turns generator settings and the metadata of one compiled template into
//! the [`Layout`] of the generated file.

use jadegen_domain::layout::{BUFFER_PARAM, EMPTY_DEFS, FUNC_PREFIX};
use jadegen_domain::{GeneratorSettings, Layout, Param, TemplateMeta};
use tracing::debug;

/// Builds the layout of the function generated for `seed`.
///
/// The metadata is consumed: each compiled template's metadata shapes exactly
/// one layout.
///
/// # Examples
///
/// ```
/// use jadegen_application::new_layout;
/// use jadegen_domain::{GeneratorSettings, TemplateMeta};
///
/// let layout = new_layout("42", &GeneratorSettings::default(), TemplateMeta::default());
/// assert_eq!(layout.func, "func tpl_42(buffer *pool.ByteBuffer) ");
/// ```
#[must_use]
pub fn new_layout(seed: &str, settings: &GeneratorSettings, meta: TemplateMeta) -> Layout {
    let mut layout = Layout::new(settings.package.clone());

    if !settings.inline {
        layout.def.push(EMPTY_DEFS.to_string());
    }

    let bbuf = settings.buffer_kind().go_type();
    layout.bbuf = bbuf.to_string();

    if settings.format {
        layout.after = reformat_snippet(seed);
    }

    let TemplateMeta {
        name,
        params,
        imports,
    } = meta;

    layout.func = match name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => format!("func {name}"),
        _ => format!("func {FUNC_PREFIX}{seed}"),
    };
    layout.func.push_str(&parameter_list(params, bbuf));

    layout
        .import
        .extend(imports.iter().map(ToString::to_string));

    debug!(seed, func = %layout.func, imports = layout.import.len(), "layout built");
    layout
}

/// Code that pretty-prints the buffer contents in place. The temporary is
/// named after the seed so several generated functions can share a file.
fn reformat_snippet(seed: &str) -> String {
    format!(
        "{seed}__buffer := hpp.Print(bytes.NewReader(buffer.Bytes()))\n\
         \t\tbuffer.Reset()\n\
         \t\tbuffer.Write({seed}__buffer)\n\
         \t\t"
    )
}

/// Renders the parameter list, guaranteeing exactly one `buffer` parameter
/// of type `bbuf`.
fn parameter_list(params: Vec<Param>, bbuf: &str) -> String {
    if params.is_empty() {
        return format!("({BUFFER_PARAM} {bbuf}) ");
    }

    let mut params = params;
    let mut has_buffer = false;
    let mut index = 0;
    while index < params.len() {
        if params[index].name != BUFFER_PARAM {
            index += 1;
            continue;
        }
        if has_buffer {
            params.remove(index);
            continue;
        }
        has_buffer = true;

        // `a, buffer T` groups `a` with the buffer's declared type; keep that
        // type for the group once the buffer type is replaced.
        let declared = std::mem::replace(&mut params[index].ty, bbuf.to_string());
        if !declared.is_empty() {
            for grouped in params[..index].iter_mut().rev() {
                if !grouped.ty.is_empty() {
                    break;
                }
                grouped.ty.clone_from(&declared);
            }
        }
        index += 1;
    }

    if !has_buffer {
        params.push(Param::new(BUFFER_PARAM, bbuf));
    }

    let entries: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("({})", entries.join(","))
}
