//! Column order for Bolt results
//!
//! Bolt rows arrive as keyed maps, so the order of the final `RETURN`
//! projection is recovered from the query text. Neo4j names an unaliased
//! column after its expression text, and an aliased one after the alias.

/// Column names projected by the query's last top-level `RETURN`, in order.
/// `RETURN *` contributes nothing.
pub fn projected_columns(cypher: &str) -> Vec<String> {
    let top = top_level_mask(cypher);

    let Some(start) = keyword_positions(cypher, &top, "RETURN")
        .last()
        .map(|p| p + "RETURN".len())
    else {
        return Vec::new();
    };

    let end = ["ORDER", "SKIP", "LIMIT", "UNION"]
        .iter()
        .filter_map(|kw| keyword_positions(cypher, &top, kw).into_iter().find(|&p| p >= start))
        .chain(
            cypher.bytes()
                .enumerate()
                .skip(start)
                .find(|&(i, b)| b == b';' && top[i])
                .map(|(i, _)| i),
        )
        .min()
        .unwrap_or(cypher.len());

    let mut items = Vec::new();
    let mut item_start = start;
    for i in start..end {
        if top[i] && cypher.as_bytes()[i] == b',' {
            items.push((item_start, i));
            item_start = i + 1;
        }
    }
    items.push((item_start, end));

    let mut columns = Vec::new();
    for (n, &(from, to)) in items.iter().enumerate() {
        let mut from = from;
        if n == 0 {
            if let Some(p) = keyword_positions(cypher, &top, "DISTINCT")
                .into_iter()
                .find(|&p| p >= from && p < to && cypher[from..p].trim().is_empty())
            {
                from = p + "DISTINCT".len();
            }
        }

        let name = match keyword_positions(cypher, &top, "AS")
            .into_iter()
            .filter(|&p| p >= from && p < to)
            .last()
        {
            Some(p) => cypher[p + "AS".len()..to].trim().trim_matches('`'),
            None => cypher[from..to].trim(),
        };

        if !name.is_empty() && name != "*" {
            columns.push(name.to_string());
        }
    }
    columns
}

/// Order row keys by the query's projection. Keys the projection does not
/// name follow in lexical order.
pub fn order_columns(keys: Vec<String>, projection: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = projection
        .iter()
        .filter(|column| keys.contains(column))
        .cloned()
        .collect();

    let mut rest: Vec<String> = keys.into_iter().filter(|k| !projection.contains(k)).collect();
    rest.sort();
    ordered.extend(rest);
    ordered
}

/// Marks every byte that sits outside brackets, string literals and
/// backtick-quoted names.
fn top_level_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len()];
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        let top = match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' && q != '`' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                false
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    false
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    false
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    false
                }
                _ => depth == 0,
            },
        };
        for slot in &mut mask[i..i + c.len_utf8()] {
            *slot = top;
        }
    }
    mask
}

/// Byte offsets of a case-insensitive, whole-word, top-level keyword.
fn keyword_positions(text: &str, top: &[bool], keyword: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let len = keyword.len();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    (0..bytes.len().saturating_sub(len - 1))
        .filter(|&i| {
            top[i]
                && bytes[i..i + len].eq_ignore_ascii_case(keyword.as_bytes())
                && (i == 0 || !is_word(bytes[i - 1]))
                && (i + len == bytes.len() || !is_word(bytes[i + len]))
        })
        .collect()
}
