//! Lists the uniforms a GLSL source declares, using the names GL reports for
//! them (`pointLights[1].base.color`). Only the subset of GLSL the renderer's
//! shaders use is understood: `struct` blocks, `uniform` declarations with
//! optional array sizes, and integer `const`/`#define` array bounds.

use std::collections::{BTreeMap, HashMap};

/// Leaf uniform name mapped to its GLSL type.
pub type DeclaredUniforms = BTreeMap<String, String>;

const PRECISION_QUALIFIERS: &[&str] = &["lowp", "mediump", "highp"];

/// Parses `source` and expands every declared uniform into its leaf names.
pub fn declared_uniforms(source: &str) -> Result<DeclaredUniforms, String> {
    let mut constants = HashMap::new();
    let tokens = tokenize(source, &mut constants);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        constants,
        structs: HashMap::new(),
    };
    let mut uniforms = DeclaredUniforms::new();

    while let Some(token) = parser.next() {
        match token {
            "struct" => parser.parse_struct()?,
            "const" => parser.parse_const(),
            "uniform" => {
                for member in parser.parse_declaration()? {
                    parser.expand(&member.name, &member, &mut uniforms)?;
                }
            }
            _ => {}
        }
    }

    Ok(uniforms)
}

#[derive(Debug, Clone)]
struct Member {
    ty: String,
    name: String,
    array_len: Option<usize>,
}

struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
    constants: HashMap<String, usize>,
    structs: HashMap<String, Vec<Member>>,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn expect(&mut self, wanted: &str) -> Result<(), String> {
        match self.next() {
            Some(token) if token == wanted => Ok(()),
            Some(token) => Err(format!("expected `{wanted}`, found `{token}`")),
            None => Err(format!("expected `{wanted}`, found end of source")),
        }
    }

    fn parse_struct(&mut self) -> Result<(), String> {
        let name = self
            .next()
            .ok_or_else(|| "struct is missing a name".to_string())?
            .to_string();
        self.expect("{")?;
        let mut members = Vec::new();
        while self.peek() != Some("}") {
            if self.peek().is_none() {
                return Err(format!("struct `{name}` is not closed"));
            }
            members.extend(self.parse_declaration()?);
        }
        self.expect("}")?;
        self.expect(";")?;
        self.structs.insert(name, members);
        Ok(())
    }

    fn parse_const(&mut self) {
        // Only `const int NAME = <integer>;` affects array sizes.
        if self.peek() != Some("int") {
            return;
        }
        let start = self.pos;
        let parsed = (|| {
            self.next()?;
            let name = self.next()?.to_string();
            (self.next()? == "=").then_some(())?;
            let value = self.next()?.parse::<usize>().ok()?;
            Some((name, value))
        })();
        match parsed {
            Some((name, value)) => {
                self.constants.insert(name, value);
            }
            None => self.pos = start,
        }
    }

    /// Parses `type name[N], other;` and returns one member per declarator.
    fn parse_declaration(&mut self) -> Result<Vec<Member>, String> {
        let mut ty = self
            .next()
            .ok_or_else(|| "declaration is missing a type".to_string())?;
        while PRECISION_QUALIFIERS.contains(&ty) {
            ty = self
                .next()
                .ok_or_else(|| "declaration is missing a type".to_string())?;
        }

        let mut members = Vec::new();
        loop {
            let name = self
                .next()
                .ok_or_else(|| format!("`{ty}` declaration is missing a name"))?;
            let mut array_len = None;
            if self.peek() == Some("[") {
                self.next();
                let size = self
                    .next()
                    .ok_or_else(|| format!("array `{name}` is missing a size"))?;
                array_len = Some(self.array_size(size)?);
                self.expect("]")?;
            }
            members.push(Member {
                ty: ty.to_string(),
                name: name.to_string(),
                array_len,
            });
            match self.next() {
                Some(",") => continue,
                Some(";") => break,
                Some(other) => return Err(format!("unexpected `{other}` after `{name}`")),
                None => return Err(format!("declaration of `{name}` is not terminated")),
            }
        }
        Ok(members)
    }

    fn array_size(&self, token: &str) -> Result<usize, String> {
        token
            .parse::<usize>()
            .ok()
            .or_else(|| self.constants.get(token).copied())
            .ok_or_else(|| format!("array size `{token}` is not an integer constant"))
    }

    fn expand(
        &self,
        root: &str,
        member: &Member,
        out: &mut DeclaredUniforms,
    ) -> Result<(), String> {
        match member.array_len {
            Some(len) => {
                for index in 0..len {
                    self.expand_scalar(&format!("{root}[{index}]"), &member.ty, out)?;
                }
                if !self.structs.contains_key(&member.ty) {
                    out.insert(root.to_string(), member.ty.clone());
                }
                Ok(())
            }
            None => self.expand_scalar(root, &member.ty, out),
        }
    }

    fn expand_scalar(&self, root: &str, ty: &str, out: &mut DeclaredUniforms) -> Result<(), String> {
        if let Some(members) = self.structs.get(ty) {
            for member in members {
                self.expand(&format!("{root}.{}", member.name), member, out)?;
            }
            Ok(())
        } else if is_builtin_type(ty) {
            out.insert(root.to_string(), ty.to_string());
            Ok(())
        } else {
            Err(format!("unknown type `{ty}` for uniform `{root}`"))
        }
    }
}

fn is_builtin_type(ty: &str) -> bool {
    const SCALARS: &[&str] = &["float", "int", "uint", "bool", "double"];
    if SCALARS.contains(&ty) || ty.starts_with("sampler") || ty.starts_with("isampler") {
        return true;
    }
    let vector = ["vec", "ivec", "uvec", "bvec", "dvec"]
        .iter()
        .any(|prefix| matches!(ty.strip_prefix(prefix), Some("2" | "3" | "4")));
    let matrix = ty
        .strip_prefix("mat")
        .or_else(|| ty.strip_prefix("dmat"))
        .is_some_and(|dims| {
            matches!(
                dims,
                "2" | "3" | "4" | "2x2" | "2x3" | "2x4" | "3x2" | "3x3" | "3x4" | "4x2" | "4x3" | "4x4"
            )
        });
    vector || matrix
}

/// Splits source into identifier/number tokens and single-character
/// punctuation, dropping comments and preprocessor lines. Integer `#define`s
/// are recorded as constants.
pub(crate) fn tokenize(source: &str, constants: &mut HashMap<String, usize>) -> Vec<String> {
    let stripped = strip_comments(source);
    let mut tokens = Vec::new();

    for line in stripped.lines() {
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.strip_prefix('#') {
            let mut parts = directive.split_whitespace();
            if parts.next() == Some("define") {
                if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                    if let Ok(value) = value.parse::<usize>() {
                        constants.insert(name.to_string(), value);
                    }
                }
            }
            continue;
        }

        let mut current = String::new();
        for ch in line.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                current.push(ch);
                continue;
            }
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            if !ch.is_whitespace() {
                tokens.push(ch.to_string());
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }

    tokens
}

pub(crate) fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '/' && chars.peek() == Some(&'/') {
            for next in chars.by_ref() {
                if next == '\n' {
                    out.push('\n');
                    break;
                }
            }
        } else if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut previous = '\0';
            for next in chars.by_ref() {
                if next == '\n' {
                    out.push('\n');
                }
                if previous == '*' && next == '/' {
                    break;
                }
                previous = next;
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"
        #version 330 core
        #define MAX_SPOTS 2
        const int MAX_POINTS = 3;

        struct Light { vec3 color; float ambientIntensity; float diffuseIntensity; };
        struct PointLight {
            Light base;
            vec3 position;
            float constant, linear, exponent;
        };
        struct SpotLight { PointLight base; vec3 direction; float edge; };

        uniform PointLight pointLights[MAX_POINTS];
        uniform SpotLight spotLights[MAX_SPOTS];
        uniform highp vec3 eyePosition; // camera
        /* uniform float commentedOut; */
        uniform sampler2D theTexture;
        uniform float weights[2];

        void main() {
            const float unused = 1.0;
        }
    "#;

    #[test]
    fn expands_struct_arrays_into_leaf_names() {
        let uniforms = declared_uniforms(FRAGMENT).unwrap();
        assert_eq!(uniforms["pointLights[2].base.color"], "vec3");
        assert_eq!(uniforms["pointLights[0].exponent"], "float");
        assert_eq!(uniforms["spotLights[1].base.base.diffuseIntensity"], "float");
        assert_eq!(uniforms["spotLights[1].edge"], "float");
        assert!(!uniforms.contains_key("pointLights[3].position"));
        assert!(!uniforms.contains_key("spotLights[2].edge"));
    }

    #[test]
    fn keeps_plain_uniforms_and_skips_comments() {
        let uniforms = declared_uniforms(FRAGMENT).unwrap();
        assert_eq!(uniforms["eyePosition"], "vec3");
        assert_eq!(uniforms["theTexture"], "sampler2D");
        assert_eq!(uniforms["weights[1]"], "float");
        assert_eq!(uniforms["weights"], "float");
        assert!(!uniforms.contains_key("commentedOut"));
    }

    #[test]
    fn unknown_struct_type_is_an_error() {
        let err = declared_uniforms("uniform Fog fog;").unwrap_err();
        assert!(err.contains("unknown type `Fog`"), "{err}");
    }

    #[test]
    fn unresolved_array_size_is_an_error() {
        assert!(declared_uniforms("uniform float values[COUNT];").is_err());
    }
}
