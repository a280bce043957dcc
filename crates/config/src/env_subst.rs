/// Expand `${VAR}` and `${VAR:-fallback}` placeholders in a profiles file.
///
/// Unset variables without a fallback are left as written so the problem
/// shows up in the loaded value instead of silently becoming empty.
pub fn substitute_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated, keep the tail verbatim.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((n, f)) => (n, Some(f)),
            None => (body, None),
        };

        match (std::env::var(name), fallback) {
            (Ok(val), _) if !name.is_empty() => out.push_str(&val),
            (_, Some(f)) => out.push_str(f),
            _ => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
