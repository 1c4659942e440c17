use std::collections::HashMap;

const EMPTY_HEADER: &str = "__EMPTY";

pub(crate) fn normalize_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Turns a raw header row into unique column keys: blanks become
/// `__EMPTY`, `__EMPTY_1`, ... and repeats gain a numeric suffix.
pub(crate) fn header_keys(raw: &[String]) -> Vec<String> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(raw.len());

    for value in raw {
        let mut base = normalize_header(value);
        if base.is_empty() {
            base = EMPTY_HEADER.to_string();
        }

        let key = match counters.get(&base).copied() {
            None => {
                counters.insert(base.clone(), 1);
                base
            }
            Some(mut counter) => {
                let mut candidate = format!("{base}_{counter}");
                counter += 1;
                while counters.contains_key(&candidate) {
                    candidate = format!("{base}_{counter}");
                    counter += 1;
                }
                counters.insert(base, counter);
                counters.insert(candidate.clone(), 1);
                candidate
            }
        };
        keys.push(key);
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_for_tests(raw: &[&str]) -> Vec<String> {
        let owned: Vec<String> = raw.iter().map(|value| value.to_string()).collect();
        header_keys(&owned)
    }

    #[test]
    fn strips_invisible_characters_and_whitespace() {
        assert_eq!(normalize_header("\u{feff}  Ventas\u{200b} "), "Ventas");
    }

    #[test]
    fn blank_headers_get_placeholder_keys() {
        assert_eq!(
            keys_for_tests(&["", "Ventas", " "]),
            vec!["__EMPTY", "Ventas", "__EMPTY_1"]
        );
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        assert_eq!(
            keys_for_tests(&["Total", "Total", "Total_1", "Total"]),
            vec!["Total", "Total_1", "Total_1_1", "Total_2"]
        );
    }
}
