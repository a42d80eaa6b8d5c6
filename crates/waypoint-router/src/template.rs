//! Path template compilation and whole-path matching

use crate::{Captures, TemplateError};

/// Piece of a composite segment such as `page-{n}`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Exact text, no tokens
    Literal(String),
    /// At least one token, possibly surrounded by literal text
    Pattern(Vec<Piece>),
    /// `{*name}` - one or more remaining segments
    Wildcard(String),
}

/// Compiled path template
///
/// Immutable once compiled. Matching is whole-path: every segment of the
/// candidate path must be consumed by the template. Empty segments in the
/// candidate (`//`, trailing `/`) are ignored.
///
/// # Example
/// ```
/// use waypoint_router::PathTemplate;
///
/// let t = PathTemplate::compile("/{module}/{controller}/{action}.{ext}").unwrap();
///
/// let params = t.match_path("/users/profile/edit.json").unwrap();
/// assert_eq!(params[2], ("action".to_string(), "edit".to_string()));
/// assert_eq!(params[3], ("ext".to_string(), "json".to_string()));
///
/// // The extension is optional
/// let params = t.match_path("/users/profile/edit").unwrap();
/// assert_eq!(params[3], ("ext".to_string(), String::new()));
///
/// // Whole-path only
/// assert!(t.match_path("/users/profile").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    ext: Option<String>,
    tokens: Vec<String>,
    is_static: bool,
}

impl PathTemplate {
    /// The static root template `/`
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
            segments: Vec::new(),
            ext: None,
            tokens: Vec::new(),
            is_static: true,
        }
    }

    /// Compile a pattern string
    ///
    /// Fails fast on empty or malformed patterns.
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        if pattern.is_empty() {
            return Err(TemplateError::Empty);
        }
        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| TemplateError::MissingLeadingSlash(pattern.to_string()))?;
        if body.is_empty() {
            return Ok(Self::root());
        }

        let body = body.strip_suffix('/').unwrap_or(body);
        let (body, ext) = split_extension(pattern, body)?;

        let raw_segments: Vec<&str> = body.split('/').collect();
        let last = raw_segments.len() - 1;
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut tokens = Vec::new();

        for (i, raw) in raw_segments.iter().enumerate() {
            if raw.is_empty() {
                return Err(TemplateError::EmptySegment(pattern.to_string()));
            }
            let segment = parse_segment(pattern, raw)?;
            match &segment {
                Segment::Literal(_) => {}
                Segment::Pattern(pieces) => {
                    for piece in pieces {
                        if let Piece::Token(name) = piece {
                            push_token(pattern, &mut tokens, name)?;
                        }
                    }
                }
                Segment::Wildcard(name) => {
                    if i != last {
                        return Err(TemplateError::MisplacedWildcard(pattern.to_string()));
                    }
                    push_token(pattern, &mut tokens, name)?;
                }
            }
            segments.push(segment);
        }

        if let Some(name) = &ext {
            push_token(pattern, &mut tokens, name)?;
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            ext,
            tokens,
            is_static: false,
        })
    }

    /// The pattern as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Token names in declaration order (extension last)
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True only for the root template `/`
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Name of the optional extension token, if declared
    pub fn ext_token(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    /// Test a candidate path
    ///
    /// Returns raw (undecoded) captures in declaration order. A declared
    /// extension that is absent from the path is captured as `""`.
    pub fn match_path(&self, path: &str) -> Option<Captures> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if self.is_static {
            return parts.is_empty().then(Vec::new);
        }

        let Some(ext_name) = &self.ext else {
            return self.match_segments(&parts);
        };

        // With the extension split off the final segment first
        if let Some((last, rest)) = parts.split_last() {
            if let Some((stem, ext)) = last.rsplit_once('.') {
                if !stem.is_empty() && !ext.is_empty() {
                    let mut candidate = rest.to_vec();
                    candidate.push(stem);
                    if let Some(mut params) = self.match_segments(&candidate) {
                        params.push((ext_name.clone(), ext.to_string()));
                        return Some(params);
                    }
                }
            }
        }

        let mut params = self.match_segments(&parts)?;
        params.push((ext_name.clone(), String::new()));
        Some(params)
    }

    fn match_segments(&self, parts: &[&str]) -> Option<Captures> {
        let mut params = Vec::with_capacity(self.tokens.len());
        let mut rest = parts;

        for segment in &self.segments {
            if let Segment::Wildcard(name) = segment {
                if rest.is_empty() {
                    return None;
                }
                params.push((name.clone(), rest.join("/")));
                return Some(params);
            }

            let (part, tail) = rest.split_first()?;
            match segment {
                Segment::Literal(lit) if lit.as_str() != *part => return None,
                Segment::Pattern(pieces) if !match_pieces(pieces, part, &mut params) => {
                    return None
                }
                _ => {}
            }
            rest = tail;
        }

        rest.is_empty().then_some(params)
    }

    /// Expand the template back into a path
    ///
    /// `lookup` supplies the already-encoded value for each token. Returns
    /// `None` when a required token has no (or an empty) value. A missing
    /// extension simply drops the suffix.
    pub fn fill<F>(&self, mut lookup: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if self.is_static {
            return Some("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(lit) => path.push_str(lit),
                Segment::Pattern(pieces) => {
                    for piece in pieces {
                        match piece {
                            Piece::Literal(lit) => path.push_str(lit),
                            Piece::Token(name) => {
                                let value = lookup(name).filter(|v| !v.is_empty())?;
                                path.push_str(&value);
                            }
                        }
                    }
                }
                Segment::Wildcard(name) => {
                    let value = lookup(name).filter(|v| !v.is_empty())?;
                    path.push_str(&value);
                }
            }
        }

        if let Some(name) = &self.ext {
            if let Some(ext) = lookup(name).filter(|v| !v.is_empty()) {
                path.push('.');
                path.push_str(&ext);
            }
        }

        Some(path)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Greedy match of composite pieces against one segment, backtracking
/// so that `{action}.{fmt}` splits `a.b.c` at the last dot.
fn match_pieces(pieces: &[Piece], input: &str, params: &mut Captures) -> bool {
    let Some((first, rest)) = pieces.split_first() else {
        return input.is_empty();
    };

    match first {
        Piece::Literal(lit) => match input.strip_prefix(lit.as_str()) {
            Some(tail) => match_pieces(rest, tail, params),
            None => false,
        },
        Piece::Token(name) => {
            if rest.is_empty() {
                if input.is_empty() {
                    return false;
                }
                params.push((name.clone(), input.to_string()));
                return true;
            }
            // The next piece is a non-empty literal, so the capture can
            // never take the whole input.
            for (end, _) in input.char_indices().rev() {
                if end == 0 {
                    break;
                }
                params.push((name.clone(), input[..end].to_string()));
                if match_pieces(rest, &input[end..], params) {
                    return true;
                }
                params.pop();
            }
            false
        }
    }
}

fn split_extension<'a>(
    pattern: &str,
    body: &'a str,
) -> Result<(&'a str, Option<String>), TemplateError> {
    let start = body.rfind('/').map_or(0, |i| i + 1);
    let last = &body[start..];

    let Some(dot) = last.rfind(".{") else {
        return Ok((body, None));
    };
    let Some(name) = last[dot + 2..].strip_suffix('}') else {
        return Ok((body, None));
    };
    if name.contains(['{', '}']) {
        return Ok((body, None));
    }
    if dot == 0 {
        return Err(TemplateError::EmptySegment(pattern.to_string()));
    }
    if name.starts_with('*') {
        return Err(TemplateError::MisplacedWildcard(pattern.to_string()));
    }
    validate_token_name(pattern, name)?;

    Ok((&body[..start + dot], Some(name.to_string())))
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, TemplateError> {
    if let Some(inner) = raw.strip_prefix("{*") {
        let name = inner
            .strip_suffix('}')
            .ok_or_else(|| TemplateError::MisplacedWildcard(pattern.to_string()))?;
        validate_token_name(pattern, name)?;
        return Ok(Segment::Wildcard(name.to_string()));
    }

    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(TemplateError::UnbalancedBrace(pattern.to_string())),
                        _ => name.push(c),
                    }
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace(pattern.to_string()));
                }
                if name.starts_with('*') {
                    return Err(TemplateError::MisplacedWildcard(pattern.to_string()));
                }
                validate_token_name(pattern, &name)?;

                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                } else if matches!(pieces.last(), Some(Piece::Token(_))) {
                    return Err(TemplateError::AdjacentTokens(pattern.to_string()));
                }
                pieces.push(Piece::Token(name));
            }
            '}' => return Err(TemplateError::UnbalancedBrace(pattern.to_string())),
            _ => literal.push(c),
        }
    }

    if pieces.is_empty() {
        return Ok(Segment::Literal(literal));
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(Segment::Pattern(pieces))
}

fn validate_token_name(pattern: &str, name: &str) -> Result<(), TemplateError> {
    if name.is_empty() {
        return Err(TemplateError::EmptyToken(pattern.to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(TemplateError::InvalidToken {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn push_token(pattern: &str, tokens: &mut Vec<String>, name: &str) -> Result<(), TemplateError> {
    if tokens.iter().any(|t| t == name) {
        return Err(TemplateError::DuplicateToken {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    tokens.push(name.to_string());
    Ok(())
}
