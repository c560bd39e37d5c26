//! Tag list parsing

const DELIMITER: char = ',';
const ESCAPE: u8 = b'\\';

/// Split `input` on unescaped commas, unescaping `\,` in the segments.
///
/// Segments come back in reverse order: `"a,b,c"` yields `["c", "b", "a"]`.
/// Leading and repeated commas produce no empty segments; a trailing `\`
/// with nothing to escape is kept verbatim.
pub fn parse_escaped_list(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    if let Some(rest) = input.strip_prefix(DELIMITER) {
        return parse_escaped_list(rest);
    }

    let mut segment = input.to_string();
    let mut offset = 0;
    while let Some(index) = segment[offset..].find(DELIMITER) {
        let at = offset + index;
        if at == 0 || segment.as_bytes()[at - 1] != ESCAPE {
            let mut segments = parse_escaped_list(&segment[at + 1..]);
            segments.push(segment[..at].to_string());
            return segments;
        }

        // drop the escape, the delimiter now sits at `at - 1`
        segment.remove(at - 1);
        offset = at;
    }

    vec![segment]
}

/// Flatten raw tag groups into one tag list, groups in the order given
pub fn combine_tags<I, S>(groups: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    groups
        .into_iter()
        .flat_map(|group| parse_escaped_list(group.as_ref()))
        .collect()
}
