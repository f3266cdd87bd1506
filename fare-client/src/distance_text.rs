/// Question sent to the model; it is asked to answer with the number only.
pub fn distance_prompt(origin: &str, destination: &str) -> String {
    format!(
        "Qual a distância de carro em quilômetros entre \"{origin}\" e \"{destination}\"? Responda apenas com o número."
    )
}

/// Pulls a positive kilometre figure out of the model's free-text answer.
///
/// The first `,` is read as a decimal separator. A number at the start of the
/// answer wins, sign included, so `-12` is rejected rather than read as `12`;
/// failing that, the first digit run anywhere in the text is used.
pub fn parse_distance_km(text: &str) -> Option<f64> {
    let sanitized = text.trim().replacen(',', ".", 1);
    let distance = leading_number(&sanitized).or_else(|| first_number_run(&sanitized))?;
    (distance.is_finite() && distance > 0.0).then_some(distance)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(bytes.get(exp_end..).unwrap_or_default());
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

fn first_number_run(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s.as_bytes()[start..];
    let mut end = count_digits(rest);
    if rest.get(end) == Some(&b'.') {
        let frac_digits = count_digits(&rest[end + 1..]);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    s[start..start + end].parse().ok()
}
