//! Markdown rendering of a [`Help`] document.
//!
//! The body is produced by a minijinja template with two filters:
//!
//! - `md` - escape Markdown syntax
//! - `mdblock(spaces)` - escape and indent every line

use commando::Help;
use minijinja::Environment;

use crate::error::DocError;
use crate::markdown;

const TEMPLATE_NAME: &str = "document.md";

const TEMPLATE: &str = r#"{% macro flag(f) %}
 - **{{ f.name|md }}**{% if f.type %} *\({{ f.type|md }}\)*{% endif %}{% if f.help or f.default %}:{% if f.help %} {{ f.help|md }}{% endif %}{% if f.default %} *default: {{ f.default|md }}*{% endif %}{% endif %}
{%- endmacro %}
{% if flags %}
## Global flags

{% for f in flags %}
{{ flag(f) }}
{% endfor %}

{% endif %}
{% if commands %}
## Commands
{% for c in commands %}

- ## {{ c.name|md }}
{% if c.help %}

    {{ c.help|md }}
{% endif %}
{% if c.usage %}

    Usage: `{{ name }} {{ c.name }} {{ c.usage }}`
{% endif %}
{% if c.long_help %}

{{ c.long_help|mdblock(4) }}
{% endif %}
{% if c.flags %}

    Flags:

{% for f in c.flags %}
    {{ flag(f) }}
{% endfor %}
{% endif %}
{% endfor %}
{% endif %}
"#;

/// Renders `help` as a Markdown document.
///
/// `header` replaces the default title (the program name underlined with
/// `=`); `footer` is appended verbatim.
pub fn render(help: &Help, header: Option<&str>, footer: Option<&str>) -> Result<String, DocError> {
    let mut out = String::new();
    match header {
        Some(header) => out.push_str(header),
        None => {
            let title = markdown::escape(&help.name);
            out.push_str(&title);
            out.push('\n');
            out.push_str(&"=".repeat(title.chars().count()));
            out.push_str("\n\n");
        }
    }

    let env = environment()?;
    out.push_str(&env.get_template(TEMPLATE_NAME)?.render(help)?);

    if let Some(footer) = footer {
        out.push_str(footer);
    }
    Ok(out)
}

fn environment() -> Result<Environment<'static>, DocError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("md", |value: String| -> String { markdown::escape(&value) });
    env.add_filter("mdblock", |value: String, spaces: usize| -> String {
        markdown::escape_block(&value, spaces)
    });
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    Ok(env)
}
