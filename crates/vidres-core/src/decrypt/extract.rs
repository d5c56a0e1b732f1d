//! Recovers the descrambling routine from player script text.
//!
//! The script is never executed. The routine is located by name, its
//! statements are read in order and each one is mapped onto a
//! `TransformOp`. Anything outside that small grammar fails extraction.

use std::collections::HashMap;

use regex::Regex;

use super::transform::{DescramblingTransform, TransformOp};
use crate::error::ResolveError;

const IDENT: &str = r"[a-zA-Z0-9$_]+";

/// Call sites that hand the scrambled signature to the routine.
const CALL_SITE_PATTERNS: &[&str] = &[
    r"\.sig\|\|([a-zA-Z0-9$_]+)\(",
    r#"["']signature["']\s*,\s*([a-zA-Z0-9$_]+)\("#,
];

/// Definitions starting with `a=a.split("")`.
const DEFINITION_PATTERNS: &[&str] = &[
    r#"([a-zA-Z0-9$_]+)\s*=\s*function\(\s*([a-zA-Z0-9$_]+)\s*\)\s*\{\s*([a-zA-Z0-9$_]+)\s*=\s*([a-zA-Z0-9$_]+)\.split\(\s*""\s*\)"#,
    r#"function\s+([a-zA-Z0-9$_]+)\(\s*([a-zA-Z0-9$_]+)\s*\)\s*\{\s*([a-zA-Z0-9$_]+)\s*=\s*([a-zA-Z0-9$_]+)\.split\(\s*""\s*\)"#,
];

/// Shape of a helper object member, decided from its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelperKind {
    Reverse,
    Swap,
    Slice,
}

impl HelperKind {
    fn classify(body: &str) -> Option<Self> {
        if body.contains(".reverse(") {
            Some(Self::Reverse)
        } else if body.contains(".splice(") || body.contains(".slice(") {
            Some(Self::Slice)
        } else if body.contains("[0]") {
            Some(Self::Swap)
        } else {
            None
        }
    }

    fn with_arg(self, arg: usize) -> TransformOp {
        match self {
            Self::Reverse => TransformOp::Reverse,
            Self::Swap => TransformOp::Swap(arg),
            Self::Slice => TransformOp::Slice(arg),
        }
    }
}

enum Statement {
    Skip,
    Op(TransformOp),
    HelperCall {
        object: String,
        member: String,
        arg: usize,
    },
}

/// Statement matchers specialised to the routine's parameter name.
struct StatementParser {
    split: Regex,
    join: Regex,
    reverse: Regex,
    splice: Regex,
    slice: Regex,
    helper_call: Regex,
}

impl StatementParser {
    fn new(param: &str) -> Result<Self, ResolveError> {
        let p = regex::escape(param);
        Ok(Self {
            split: compile(&format!(r#"^{p}\s*=\s*{p}\.split\(\s*""\s*\)$"#))?,
            join: compile(&format!(r#"^return\s+{p}\.join\(\s*""\s*\)$"#))?,
            reverse: compile(&format!(r"^(?:{p}\s*=\s*)?{p}\.reverse\(\s*\)$"))?,
            splice: compile(&format!(r"^(?:{p}\s*=\s*)?{p}\.splice\(\s*0\s*,\s*(\d+)\s*\)$"))?,
            slice: compile(&format!(r"^{p}\s*=\s*{p}\.slice\(\s*(\d+)\s*\)$"))?,
            helper_call: compile(&format!(
                r#"^(?:{p}\s*=\s*)?({IDENT})(?:\.({IDENT})|\[\s*["']({IDENT})["']\s*\])\(\s*{p}\s*,\s*(\d+)\s*\)$"#
            ))?,
        })
    }

    fn parse(&self, stmt: &str) -> Result<Statement, ResolveError> {
        if self.split.is_match(stmt) || self.join.is_match(stmt) {
            return Ok(Statement::Skip);
        }
        if self.reverse.is_match(stmt) {
            return Ok(Statement::Op(TransformOp::Reverse));
        }
        if let Some(c) = self.splice.captures(stmt).or_else(|| self.slice.captures(stmt)) {
            return Ok(Statement::Op(TransformOp::Slice(parse_arg(&c[1])?)));
        }
        if let Some(c) = self.helper_call.captures(stmt) {
            let member = c
                .get(2)
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Ok(Statement::HelperCall {
                object: c[1].to_string(),
                member,
                arg: parse_arg(&c[4])?,
            });
        }
        Err(ResolveError::TransformExtractionFailed(format!(
            "unsupported statement `{stmt}`"
        )))
    }
}

/// Extracts the ordered descrambling operations from a player script.
pub fn extract_transform(script: &str) -> Result<DescramblingTransform, ResolveError> {
    let (name, param, body) = locate_routine(script)?;
    tracing::debug!(routine = %name, "descrambling routine located");

    let parser = StatementParser::new(&param)?;
    let mut helpers: HashMap<String, HashMap<String, HelperKind>> = HashMap::new();
    let mut ops = Vec::new();

    for stmt in body.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        match parser.parse(stmt)? {
            Statement::Skip => {}
            Statement::Op(op) => ops.push(op),
            Statement::HelperCall { object, member, arg } => {
                if !helpers.contains_key(&object) {
                    let members = helper_members(script, &object)?;
                    helpers.insert(object.clone(), members);
                }
                let kind = helpers
                    .get(&object)
                    .and_then(|m| m.get(&member))
                    .copied()
                    .ok_or_else(|| {
                        ResolveError::TransformExtractionFailed(format!(
                            "helper {object}.{member} has no recognizable shape"
                        ))
                    })?;
                ops.push(kind.with_arg(arg));
            }
        }
    }

    if ops.is_empty() {
        return Err(ResolveError::TransformExtractionFailed(format!(
            "routine {name} has no operations"
        )));
    }
    Ok(DescramblingTransform::new(ops))
}

/// Finds the routine name and returns `(name, param, body)`.
///
/// Call sites are tried first; definitions shaped like a split/join routine
/// are the fallback.
fn locate_routine(script: &str) -> Result<(String, String, String), ResolveError> {
    let mut names: Vec<String> = Vec::new();
    for pattern in CALL_SITE_PATTERNS.iter().chain(DEFINITION_PATTERNS) {
        let re = compile(pattern)?;
        for c in re.captures_iter(script) {
            let name = c[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    for name in &names {
        if let Some((param, body)) = routine_body(script, name)? {
            if body.contains(".split(") {
                return Ok((name.clone(), param, body));
            }
        }
    }

    Err(ResolveError::TransformExtractionFailed(if names.is_empty() {
        "no signature routine referenced in player script".to_string()
    } else {
        format!("no split/join definition for {}", names.join(", "))
    }))
}

fn routine_body(script: &str, name: &str) -> Result<Option<(String, String)>, ResolveError> {
    let n = regex::escape(name);
    let re = compile(&format!(
        r"(?:function\s+{n}|(?:^|[^a-zA-Z0-9$_.]){n}\s*=\s*function)\s*\(\s*({IDENT})\s*\)\s*\{{([^}}]*)\}}"
    ))?;
    Ok(re
        .captures(script)
        .map(|c| (c[1].to_string(), c[2].to_string())))
}

/// Members of `var OBJ={name:function(a,b){...},...};` keyed by member name.
fn helper_members(script: &str, object: &str) -> Result<HashMap<String, HelperKind>, ResolveError> {
    let o = regex::escape(object);
    let object_re = compile(&format!(
        r"(?s)(?:^|[^a-zA-Z0-9$_.]){o}\s*=\s*\{{(.*?)\}}\s*;"
    ))?;
    let literal = object_re
        .captures(script)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            ResolveError::TransformExtractionFailed(format!("helper object {object} not found"))
        })?;

    let member_re = compile(&format!(
        r#"["']?({IDENT})["']?\s*:\s*function\s*\([^)]*\)\s*\{{([^}}]*)\}}"#
    ))?;
    let members = member_re
        .captures_iter(&literal)
        .filter_map(|c| HelperKind::classify(&c[2]).map(|kind| (c[1].to_string(), kind)))
        .collect();
    Ok(members)
}

fn compile(pattern: &str) -> Result<Regex, ResolveError> {
    Regex::new(pattern)
        .map_err(|e| ResolveError::TransformExtractionFailed(format!("pattern: {e}")))
}

fn parse_arg(raw: &str) -> Result<usize, ResolveError> {
    raw.parse()
        .map_err(|_| ResolveError::TransformExtractionFailed(format!("bad argument `{raw}`")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Player script excerpt in the shape served for older player versions.
    pub(crate) const PLAYER_SCRIPT: &str = r#"
var yt=yt||{};(function(){var Xy={Ab:function(a){a.reverse()},
Cd:function(a,b){a.splice(0,b)},Ef:function(a,b){var c=a[0];a[0]=a[b%a.length];a[b]=c}};
var Zq=function(a){a=a.split("");Xy.Ef(a,2);Xy.Cd(a,1);Xy.Ab(a,7);return a.join("")};
g.load=function(c){var b=c.url;c.s&&(b+="&signature="+(c.sig||Zq(c.s)));return b};})();
"#;

    #[test]
    fn helper_object_routine() {
        let t = extract_transform(PLAYER_SCRIPT).unwrap();
        assert_eq!(
            t.ops(),
            &[TransformOp::Swap(2), TransformOp::Slice(1), TransformOp::Reverse]
        );
        assert_eq!(t.apply("abcdefghij"), "jihgfedab");
    }

    #[test]
    fn direct_statements_and_declaration_form() {
        let script = r#"function $q(x){x=x.split("");x.reverse();x=x.slice(3);x.splice(0,1);return x.join("")}"#;
        let t = extract_transform(script).unwrap();
        assert_eq!(
            t.ops(),
            &[TransformOp::Reverse, TransformOp::Slice(3), TransformOp::Slice(1)]
        );
    }

    #[test]
    fn bracket_member_access_and_signature_call_site() {
        let script = r#"
var K$={"rv":function(a){a.reverse()},"sw":function(a,b){var c=a[0];a[0]=a[b%a.length];a[b%a.length]=c}};
Pm=function(a){a=a.split("");K$["sw"](a,5);K$.rv(a,0);return a.join("")};
h.set("signature",Pm(d));
"#;
        let t = extract_transform(script).unwrap();
        assert_eq!(t.ops(), &[TransformOp::Swap(5), TransformOp::Reverse]);
    }

    #[test]
    fn missing_routine_fails() {
        let err = extract_transform("var a=1;function f(){return 2}").unwrap_err();
        assert!(matches!(err, ResolveError::TransformExtractionFailed(_)));
    }

    #[test]
    fn unsupported_statement_fails() {
        let script = r#"Zq=function(a){a=a.split("");a.push("x");return a.join("")};"#;
        let err = extract_transform(script).unwrap_err();
        match err {
            ResolveError::TransformExtractionFailed(msg) => assert!(msg.contains("a.push")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_helper_member_fails() {
        let script = r#"
var Xy={Ab:function(a){a.reverse()}};
Zq=function(a){a=a.split("");Xy.Zz(a,3);return a.join("")};
"#;
        let err = extract_transform(script).unwrap_err();
        assert!(matches!(err, ResolveError::TransformExtractionFailed(_)));
    }
}
