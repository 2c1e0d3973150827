//! Case-insensitive mnemonic comparison and command pattern matching.
//!
//! Patterns are written in the SCPI long/short form convention: the
//! uppercase run of a keyword is the short form, the full keyword the long
//! form, and a command matches either of the two exactly. `[…]` delimits
//! optional keyword groups and a trailing `#` on a keyword captures a
//! numeric header suffix (`CHANnel#` matches `CHAN`, `chan2`, `CHANNEL42`).

/// Length of the short form, i.e. the position of the first lowercase letter.
fn short_form_len(pattern: &[u8]) -> usize {
    pattern
        .iter()
        .position(|c| c.is_ascii_lowercase())
        .unwrap_or(pattern.len())
}

/// Position of the next pattern separator (`?`, `:`, `[`, `]`) or end.
fn pattern_separator_pos(pattern: &[u8]) -> usize {
    pattern
        .iter()
        .position(|c| matches!(c, b'?' | b':' | b'[' | b']'))
        .unwrap_or(pattern.len())
}

/// Position of the next command-header separator (`:`, `?`) or end.
fn cmd_separator_pos(cmd: &[u8]) -> usize {
    cmd.iter()
        .position(|c| matches!(c, b':' | b'?'))
        .unwrap_or(cmd.len())
}

/// Compare two keywords; equal length and ASCII case-insensitive.
pub(crate) fn compare_str(str1: &[u8], str2: &[u8]) -> bool {
    str1.eq_ignore_ascii_case(str2)
}

/// Compare a keyword against a candidate that may extend it with a decimal
/// numeric suffix. With `num` the suffix must parse as an `i32` consuming
/// every trailing byte and is stored through it; an absent suffix leaves
/// `num` untouched.
pub(crate) fn compare_str_and_num(str1: &[u8], str2: &[u8], num: Option<&mut i32>) -> bool {
    if str2.len() < str1.len() {
        return false;
    }
    if !str1.eq_ignore_ascii_case(&str2[..str1.len()]) {
        return false;
    }
    let tail = &str2[str1.len()..];
    match num {
        Some(num) => {
            if tail.is_empty() {
                return true;
            }
            match lexical_core::parse::<i32>(tail) {
                Ok(n) => {
                    *num = n;
                    true
                }
                Err(_) => false,
            }
        }
        None => tail.iter().all(|c| c.is_ascii_digit()),
    }
}

/// Match one pattern keyword (`UPPERlower`, optionally `#`-terminated)
/// against one command keyword, accepting the exact short or exact long
/// form.
pub fn match_pattern(pattern: &[u8], s: &[u8], mut num: Option<&mut i32>) -> bool {
    if let Some((b'#', head)) = pattern.split_last() {
        let short = short_form_len(head);
        compare_str_and_num(head, s, num.as_deref_mut())
            || compare_str_and_num(&head[..short], s, num)
    } else {
        let short = short_form_len(pattern);
        compare_str(pattern, s) || compare_str(&pattern[..short], s)
    }
}

/// Match a command pattern, e.g. `[:MEASure]:VOLTage:DC?`, against a
/// complete command header.
///
/// Numeric suffixes captured by `#` placeholders are stored into `numbers`
/// in pattern order; placeholders without a matching digit run in the input
/// yield `default`.
pub fn match_command(
    pattern: &[u8],
    cmd: &[u8],
    mut numbers: Option<&mut [i32]>,
    default: i32,
) -> bool {
    let mut pattern = pattern;
    let mut cmd = cmd;
    let mut brackets = 0i32;
    let mut numbers_idx = 0usize;

    if pattern.is_empty() || cmd.is_empty() {
        return false;
    }

    /* both sides must agree on the query form */
    match (pattern.last() == Some(&b'?'), cmd.last() == Some(&b'?')) {
        (true, true) => {
            pattern = &pattern[..pattern.len() - 1];
            cmd = &cmd[..cmd.len() - 1];
        }
        (true, false) | (false, true) => return false,
        (false, false) => {}
    }

    /* optional keywords may open the pattern, e.g. [:MEASure]:VOLTage:DC? */
    if pattern.first() == Some(&b'[') {
        pattern = &pattern[1..];
        brackets += 1;
    }
    if pattern.first() == Some(&b':') {
        pattern = &pattern[1..];
    }

    /* a leading ':' is tolerated in the input, but ":*IDN?" is not */
    if cmd.first() == Some(&b':') && cmd.len() >= 2 {
        if cmd[1] == b'*' {
            return false;
        }
        cmd = &cmd[1..];
    }

    loop {
        let psp = pattern_separator_pos(pattern);
        let csp = cmd_separator_pos(cmd);

        /* a '#' ending the pattern keyword captures a numeric suffix */
        let number = if psp > 0 && pattern.get(psp - 1) == Some(&b'#') {
            let slot = numbers
                .as_deref_mut()
                .and_then(|numbers| numbers.get_mut(numbers_idx));
            numbers_idx += 1;
            slot.map(|slot| {
                *slot = default;
                slot
            })
        } else {
            None
        };

        if match_pattern(&pattern[..psp], &cmd[..csp], number) {
            pattern = &pattern[psp..];
            cmd = &cmd[csp..];

            /* command is complete */
            if pattern.is_empty() && cmd.is_empty() {
                return true;
            }
            /* pattern complete, but command not */
            if pattern.is_empty() {
                return false;
            }
            /* command complete: all residual pattern segments must sit
             * inside optional groups */
            if cmd.is_empty() {
                while !pattern.is_empty() {
                    let psp = pattern_separator_pos(pattern);
                    match pattern.get(psp) {
                        Some(b'[') => brackets += 1,
                        Some(b']') => brackets -= 1,
                        Some(_) => {}
                        /* residual bare keyword outside any group */
                        None => return false,
                    }
                    pattern = &pattern[psp + 1..];
                    if brackets == 0 && pattern.first() != Some(&b'[') {
                        break;
                    }
                }
                return pattern.is_empty();
            }

            /* both sides continue, consume the keyword separator */
            let colon = cmd.first() == Some(&b':');
            if colon && pattern.first() == Some(&b':') {
                pattern = &pattern[1..];
                cmd = &cmd[1..];
            } else if colon && pattern.starts_with(b"[:") {
                pattern = &pattern[2..];
                cmd = &cmd[1..];
                brackets += 1;
            } else if colon && pattern.starts_with(b"]:") {
                pattern = &pattern[2..];
                cmd = &cmd[1..];
                brackets -= 1;
            } else if colon && pattern.starts_with(b"][:") {
                pattern = &pattern[3..];
                cmd = &cmd[1..];
            } else {
                return false;
            }
        } else {
            /* keyword mismatch: skip the pattern segment if it closes an
             * optional group, otherwise fail */
            pattern = &pattern[psp..];
            if pattern.starts_with(b"]:") {
                pattern = &pattern[2..];
                brackets -= 1;
            } else if pattern.starts_with(b"][:") {
                pattern = &pattern[3..];
            } else {
                return false;
            }
        }
    }
}
