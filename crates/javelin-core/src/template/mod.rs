//! Text templating for build scripts and build-support files.
//!
//! The engine supports variable interpolation (`{{ path }}`, with dotted
//! lookup through nested maps), conditional blocks (`{% if path %} … {% else
//! %} … {% end %}`), iteration (`{% for item in path %} … {% end %}`), and
//! custom tags registered in a [`TagSet`]. Rendering is a pure function of
//! template text, parameter set and tag registry; it performs no I/O.

mod tags;
mod value;

pub use tags::{TagHandler, TagSet};
pub use value::{Params, Value};

use crate::error::{Error, Result};

/// A parsed template, bound to the tag registry it was parsed against.
pub struct Template<'t, 'h> {
    nodes: Vec<Node>,
    tags: &'t TagSet<'h>,
}

#[derive(Debug)]
enum Node {
    Text(String),
    Interp(String),
    If {
        cond: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    For {
        var: String,
        list: String,
        body: Vec<Node>,
    },
    Call {
        handler: usize,
        kind: String,
        payload: String,
    },
}

#[derive(Debug)]
enum Piece {
    Text(String),
    Expr(String),
    Block(String),
    Call {
        handler: usize,
        kind: String,
        payload: String,
    },
}

impl<'t, 'h> Template<'t, 'h> {
    /// Parse template text against a tag registry.
    pub fn parse(source: &str, tags: &'t TagSet<'h>) -> Result<Self> {
        let pieces = tokenize(source, tags)?;
        let mut iter = pieces.into_iter().peekable();
        let (nodes, terminator) = parse_nodes(&mut iter, &[])?;
        if let Some(terminator) = terminator {
            return Err(Error::TemplateSyntax(format!(
                "unexpected '{terminator}' outside a block"
            )));
        }
        Ok(Self { nodes, tags })
    }

    /// Render with the given parameters.
    pub fn render(&self, params: &Params) -> Result<String> {
        let mut out = String::new();
        let mut scopes = Vec::new();
        self.render_nodes(&self.nodes, params, &mut scopes, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        params: &Params,
        scopes: &mut Vec<(String, Value)>,
        out: &mut String,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Interp(path) => match lookup(path, params, scopes) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        tracing::debug!(path = %path, "template parameter not bound");
                    }
                },
                Node::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    let truthy = lookup(cond, params, scopes).is_some_and(Value::truthy);
                    let branch = if truthy { then } else { otherwise };
                    self.render_nodes(branch, params, scopes, out)?;
                }
                Node::For { var, list, body } => {
                    let items = match lookup(list, params, scopes) {
                        Some(Value::List(items)) => items.clone(),
                        Some(_) | None => {
                            tracing::debug!(path = %list, "loop parameter is not a list");
                            Vec::new()
                        }
                    };
                    for item in items {
                        scopes.push((var.clone(), item));
                        self.render_nodes(body, params, scopes, out)?;
                        scopes.pop();
                    }
                }
                Node::Call {
                    handler,
                    kind,
                    payload,
                } => {
                    self.tags.handler(*handler).render(kind, payload, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Resolve a dotted path against loop scopes (innermost first), then the
/// parameter set.
fn lookup<'a>(path: &str, params: &'a Params, scopes: &'a [(String, Value)]) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    if let Some((_, scoped)) = scopes.iter().rev().find(|(name, _)| name == first) {
        let mut current = scoped;
        for segment in segments {
            current = current.member(segment)?;
        }
        return Some(current);
    }
    params.lookup(path)
}

/// Characters that end an inline custom-tag payload.
fn ends_payload(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '%' | '"' | '\'')
}

fn tokenize(source: &str, tags: &TagSet<'_>) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut pos = 0;
    let mut prev_char: Option<char> = None;

    'scan: while pos < source.len() {
        let rest = &source[pos..];

        if let Some(inner) = rest.strip_prefix("{{") {
            let Some(end) = inner.find("}}") else {
                return Err(Error::TemplateSyntax("unclosed '{{'".to_string()));
            };
            flush_text(&mut pieces, &mut text);
            pieces.push(Piece::Expr(inner[..end].trim().to_string()));
            pos += 2 + end + 2;
            prev_char = Some('}');
            continue;
        }

        if let Some(inner) = rest.strip_prefix("{%") {
            let Some(end) = inner.find("%}") else {
                return Err(Error::TemplateSyntax("unclosed '{%'".to_string()));
            };
            flush_text(&mut pieces, &mut text);
            pieces.push(Piece::Block(inner[..end].trim().to_string()));
            pos += 2 + end + 2;
            prev_char = Some('}');
            continue;
        }

        // Prefix-token form: `:programref:KIND:payload`.
        for (index, handler) in tags.handlers().iter().enumerate() {
            if let Some(after) = rest.strip_prefix(handler.token()) {
                let body_len = after.find(ends_payload).unwrap_or(after.len());
                let body = &after[..body_len];
                let (kind, payload) = body.split_once(':').unwrap_or((body, ""));
                flush_text(&mut pieces, &mut text);
                pieces.push(Piece::Call {
                    handler: index,
                    kind: kind.to_string(),
                    payload: payload.to_string(),
                });
                pos += handler.token().len() + body_len;
                prev_char = body.chars().last().or(prev_char);
                continue 'scan;
            }
        }

        // Alias form: `KIND:payload`, case-sensitive, at a word boundary.
        let at_boundary = prev_char.is_none_or(|c| !c.is_alphanumeric() && c != '_');
        if at_boundary {
            for (index, handler) in tags.handlers().iter().enumerate() {
                for alias in handler.aliases() {
                    let Some(after) = rest.strip_prefix(alias) else {
                        continue;
                    };
                    let Some(after) = after.strip_prefix(':') else {
                        continue;
                    };
                    let payload_len = after.find(ends_payload).unwrap_or(after.len());
                    flush_text(&mut pieces, &mut text);
                    pieces.push(Piece::Call {
                        handler: index,
                        kind: (*alias).to_string(),
                        payload: after[..payload_len].to_string(),
                    });
                    pos += alias.len() + 1 + payload_len;
                    prev_char = after[..payload_len].chars().last().or(Some(':'));
                    continue 'scan;
                }
            }
        }

        let c = rest.chars().next().expect("non-empty remainder");
        text.push(c);
        prev_char = Some(c);
        pos += c.len_utf8();
    }

    flush_text(&mut pieces, &mut text);
    Ok(pieces)
}

fn flush_text(pieces: &mut Vec<Piece>, text: &mut String) {
    if !text.is_empty() {
        pieces.push(Piece::Text(std::mem::take(text)));
    }
}

/// Parse pieces into nodes until one of `terminators` ('else'/'end') is hit.
/// Returns the nodes and the terminator that ended them, if any.
fn parse_nodes(
    pieces: &mut std::iter::Peekable<std::vec::IntoIter<Piece>>,
    terminators: &[&str],
) -> Result<(Vec<Node>, Option<String>)> {
    let mut nodes = Vec::new();

    while let Some(piece) = pieces.next() {
        match piece {
            Piece::Text(text) => nodes.push(Node::Text(text)),
            Piece::Expr(path) => {
                if path.is_empty() {
                    return Err(Error::TemplateSyntax("empty '{{ }}' expression".to_string()));
                }
                nodes.push(Node::Interp(path));
            }
            Piece::Call {
                handler,
                kind,
                payload,
            } => nodes.push(Node::Call {
                handler,
                kind,
                payload,
            }),
            Piece::Block(content) => {
                let keyword = content.split_whitespace().next().unwrap_or("");
                if terminators.contains(&keyword) {
                    return Ok((nodes, Some(content)));
                }
                match keyword {
                    "if" => {
                        let cond = content["if".len()..].trim().to_string();
                        if cond.is_empty() {
                            return Err(Error::TemplateSyntax(
                                "'if' block without a condition".to_string(),
                            ));
                        }
                        let (then, terminator) = parse_nodes(pieces, &["else", "end"])?;
                        let otherwise = match terminator.as_deref() {
                            Some("else") => {
                                let (otherwise, terminator) = parse_nodes(pieces, &["end"])?;
                                if terminator.is_none() {
                                    return Err(Error::TemplateSyntax(
                                        "unclosed 'else' block".to_string(),
                                    ));
                                }
                                otherwise
                            }
                            Some(_) => Vec::new(),
                            None => {
                                return Err(Error::TemplateSyntax(
                                    "unclosed 'if' block".to_string(),
                                ));
                            }
                        };
                        nodes.push(Node::If {
                            cond,
                            then,
                            otherwise,
                        });
                    }
                    "for" => {
                        let rest = content["for".len()..].trim();
                        let mut parts = rest.split_whitespace();
                        let (Some(var), Some("in"), Some(list), None) =
                            (parts.next(), parts.next(), parts.next(), parts.next())
                        else {
                            return Err(Error::TemplateSyntax(format!(
                                "malformed 'for' block: '{content}'"
                            )));
                        };
                        let (body, terminator) = parse_nodes(pieces, &["end"])?;
                        if terminator.is_none() {
                            return Err(Error::TemplateSyntax("unclosed 'for' block".to_string()));
                        }
                        nodes.push(Node::For {
                            var: var.to_string(),
                            list: list.to_string(),
                            body,
                        });
                    }
                    other => {
                        return Err(Error::TemplateSyntax(format!(
                            "unknown block tag: '{other}'"
                        )));
                    }
                }
            }
        }
    }

    Ok((nodes, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str, params: &Params) -> String {
        let tags = TagSet::new();
        Template::parse(source, &tags).unwrap().render(params).unwrap()
    }

    #[test]
    fn literal_text_renders_unchanged() {
        let source = "haxe -cp src -main Main\nplain { braces } stay";
        assert_eq!(render(source, &Params::new()), source);
    }

    #[test]
    fn interpolation_and_nested_paths() {
        let mut params = Params::new();
        params.set("name", "App");
        params.set(
            "subtarget",
            Value::map([("cmd_switch", Value::from("-js"))]),
        );
        assert_eq!(
            render("{{ name }} {{ subtarget.cmd_switch }}", &params),
            "App -js"
        );
    }

    #[test]
    fn missing_parameter_renders_empty() {
        assert_eq!(render("[{{ nothing }}]", &Params::new()), "[]");
    }

    #[test]
    fn conditionals() {
        let mut params = Params::new();
        params.set("debug", true);
        assert_eq!(render("{% if debug %}-debug{% end %}", &params), "-debug");

        params.set("debug", false);
        assert_eq!(render("{% if debug %}-debug{% end %}", &params), "");
        assert_eq!(
            render("{% if debug %}-debug{% else %}-release{% end %}", &params),
            "-release"
        );
    }

    #[test]
    fn truthy_conditions_on_strings() {
        let mut params = Params::new();
        params.set("icon", "icon.png");
        assert_eq!(render("{% if icon %}yes{% end %}", &params), "yes");
        params.set("icon", "");
        assert_eq!(render("{% if icon %}yes{% end %}", &params), "");
    }

    #[test]
    fn loops_bind_the_loop_variable() {
        let mut params = Params::new();
        params.set("defines", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            render("{% for define in defines %}-D {{ define }};{% end %}", &params),
            "-D a;-D b;"
        );
    }

    #[test]
    fn loops_over_maps_expose_members() {
        let mut params = Params::new();
        params.set(
            "flags",
            Value::List(vec![
                Value::map([("name", Value::from("-lib")), ("value", Value::from("lime"))]),
            ]),
        );
        assert_eq!(
            render(
                "{% for flag in flags %}{{ flag.name }} {{ flag.value }}{% end %}",
                &params
            ),
            "-lib lime"
        );
    }

    #[test]
    fn nested_blocks() {
        let mut params = Params::new();
        params.set("outer", true);
        params.set("items", vec!["x".to_string()]);
        assert_eq!(
            render(
                "{% if outer %}{% for i in items %}<{{ i }}>{% end %}{% end %}",
                &params
            ),
            "<x>"
        );
    }

    #[test]
    fn unclosed_blocks_are_rejected() {
        let tags = TagSet::new();
        assert!(matches!(
            Template::parse("{% if x %}oops", &tags),
            Err(Error::TemplateSyntax(_))
        ));
        assert!(matches!(
            Template::parse("{% for a in b %}oops", &tags),
            Err(Error::TemplateSyntax(_))
        ));
        assert!(matches!(
            Template::parse("{% end %}", &tags),
            Err(Error::TemplateSyntax(_))
        ));
        assert!(matches!(
            Template::parse("{{ unclosed", &tags),
            Err(Error::TemplateSyntax(_))
        ));
    }

    struct UpperTag;

    impl TagHandler for UpperTag {
        fn token(&self) -> &str {
            ":upper:"
        }

        fn aliases(&self) -> &[&'static str] {
            &["UPPER"]
        }

        fn render(&self, kind: &str, payload: &str, out: &mut String) -> Result<()> {
            out.push_str(&format!("{}={}", kind, payload.to_uppercase()));
            Ok(())
        }
    }

    #[test]
    fn custom_tag_token_form() {
        let tags = TagSet::new().with(Box::new(UpperTag));
        let params = Params::new();
        let rendered = Template::parse("x :upper:UPPER:abc y", &tags)
            .unwrap()
            .render(&params)
            .unwrap();
        assert_eq!(rendered, "x UPPER=ABC y");
    }

    #[test]
    fn custom_tag_alias_form() {
        let tags = TagSet::new().with(Box::new(UpperTag));
        let params = Params::new();
        let rendered = Template::parse("UPPER:abc", &tags)
            .unwrap()
            .render(&params)
            .unwrap();
        assert_eq!(rendered, "UPPER=ABC");
    }

    #[test]
    fn alias_matching_is_case_sensitive() {
        let tags = TagSet::new().with(Box::new(UpperTag));
        let params = Params::new();
        let rendered = Template::parse("upper:abc", &tags)
            .unwrap()
            .render(&params)
            .unwrap();
        assert_eq!(rendered, "upper:abc");
    }

    #[test]
    fn alias_requires_word_boundary() {
        let tags = TagSet::new().with(Box::new(UpperTag));
        let params = Params::new();
        let rendered = Template::parse("superUPPER:abc", &tags)
            .unwrap()
            .render(&params)
            .unwrap();
        assert_eq!(rendered, "superUPPER:abc");
    }
}
