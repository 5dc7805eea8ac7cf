use crate::error::PathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'a> {
    pub name: &'a str,
    pub index: Option<usize>,
}

/// Number of segments in a (plain or indexed) path. The empty path has none.
pub fn segment_count(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('.').count()
    }
}

pub fn parse_indexed_path(path: &str) -> Result<Vec<PathSegment<'_>>, PathError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('.').map(|raw| parse_segment(path, raw)).collect()
}

fn parse_segment<'a>(path: &str, raw: &'a str) -> Result<PathSegment<'a>, PathError> {
    let malformed = |reason| PathError::Malformed {
        path: path.to_string(),
        reason,
    };

    let Some(open) = raw.find('[') else {
        if raw.contains(']') {
            return Err(malformed("unmatched ']'"));
        }
        return Ok(PathSegment {
            name: raw,
            index: None,
        });
    };

    let inner = raw[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| malformed("index must close the segment"))?;
    let index = inner
        .parse::<usize>()
        .map_err(|_| malformed("index must be a non-negative integer"))?;

    Ok(PathSegment {
        name: &raw[..open],
        index: Some(index),
    })
}
