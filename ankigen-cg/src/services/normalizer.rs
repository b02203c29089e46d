//! Word candidate normalization
//!
//! Canonicalizes a raw generated word into the comparison key used for
//! duplicate detection and storage. Deterministic and total: empty or
//! whitespace-only input normalizes to the empty key, which the quality gate
//! rejects upstream.

/// Normalize a raw word into its comparison key
///
/// Lowercases, trims, collapses interior whitespace, folds accented Latin
/// characters to their ASCII base form, and strips punctuation that is not
/// semantically part of the word (interior hyphens and apostrophes survive,
/// as in "check-in" or "o'clock").
pub fn normalize_word(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        for folded in fold_char(ch) {
            let lower = folded.to_lowercase();
            for c in lower {
                if c.is_alphanumeric() || c == '-' || c == '\'' {
                    if pending_space && !out.is_empty() {
                        out.push(' ');
                    }
                    pending_space = false;
                    out.push(c);
                }
            }
        }
    }

    // Leading/trailing hyphens or apostrophes are punctuation, not word parts
    out.trim_matches(|c| c == '-' || c == '\'').to_string()
}

/// Fold one accented Latin character to its unaccented base form
///
/// Covers Latin-1 Supplement and the Latin Extended-A ranges that appear in
/// the supported study languages; anything else passes through unchanged.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    let folded: &[char] = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => &['a'],
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => &['A'],
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => &['e'],
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => &['E'],
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => &['i'],
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => &['I'],
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => &['o'],
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => &['O'],
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => &['u'],
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => &['U'],
        'ý' | 'ÿ' => &['y'],
        'Ý' | 'Ÿ' => &['Y'],
        'ñ' | 'ń' | 'ņ' | 'ň' => &['n'],
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => &['N'],
        'ç' | 'ć' | 'ĉ' | 'č' => &['c'],
        'Ç' | 'Ć' | 'Ĉ' | 'Č' => &['C'],
        'ś' | 'ŝ' | 'ş' | 'š' => &['s'],
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => &['S'],
        'ź' | 'ż' | 'ž' => &['z'],
        'Ź' | 'Ż' | 'Ž' => &['Z'],
        'ł' => &['l'],
        'Ł' => &['L'],
        'ð' => &['d'],
        'þ' => &['t', 'h'],
        'ß' => &['s', 's'],
        'æ' => &['a', 'e'],
        'Æ' => &['A', 'E'],
        'œ' => &['o', 'e'],
        'Œ' => &['O', 'E'],
        _ => return Folded::Same(ch).into_iter(),
    };
    Folded::Mapped(folded.iter().copied().collect()).into_iter()
}

enum Folded {
    Same(char),
    Mapped(Vec<char>),
}

impl IntoIterator for Folded {
    type Item = char;
    type IntoIter = std::vec::IntoIter<char>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Folded::Same(c) => vec![c].into_iter(),
            Folded::Mapped(v) => v.into_iter(),
        }
    }
}
