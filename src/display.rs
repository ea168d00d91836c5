use credkit::CredkitError;
use credkit::env::Env;
use credkit::logging::should_use_colors;
use crossterm::style::Stylize;

pub fn print_success(message: &str) {
    tracing::info!("✓ {}", message);
}

pub fn print_info(message: &str) {
    tracing::info!("{}", message);
}

pub fn print_warning(message: &str) {
    tracing::warn!("{}", message);
}

/// Green or red status word, plain when colours are disabled.
pub fn status_label(ok: bool, text: &str) -> String {
    if !should_use_colors(&Env::real()) {
        return text.to_string();
    }
    if ok {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Prints `rows` as a two-column table with a header.
pub fn print_pairs_table(headers: (&str, &str), rows: &[(String, String)]) {
    for line in render_pairs_table(headers, rows) {
        println!("{}", line);
    }
}

pub fn render_pairs_table(headers: (&str, &str), rows: &[(String, String)]) -> Vec<String> {
    let key_width = rows
        .iter()
        .map(|(k, _)| k.chars().count())
        .chain(std::iter::once(headers.0.len()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| v.chars().count())
        .chain(std::iter::once(headers.1.len()))
        .max()
        .unwrap_or(0);

    let rule = format!(
        "{:-<width$}-+-{:-<vwidth$}-",
        "",
        "",
        width = key_width,
        vwidth = value_width
    );

    let mut lines = vec![
        rule.clone(),
        format!(
            " {:^width$} | {:^vwidth$} ",
            headers.0,
            headers.1,
            width = key_width,
            vwidth = value_width
        ),
        rule.clone(),
    ];
    for (key, value) in rows {
        lines.push(format!(
            " {:width$} | {:vwidth$} ",
            key,
            value,
            width = key_width,
            vwidth = value_width
        ));
    }
    lines.push(rule);
    lines
}

pub fn format_json_output<T: serde::Serialize>(data: &T) -> Result<String, CredkitError> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_columns_align() {
        let rows = vec![
            ("region".to_string(), "us-east-1".to_string()),
            ("source".to_string(), "shared-file".to_string()),
        ];
        let lines = render_pairs_table(("Field", "Value"), &rows);

        assert_eq!(lines.len(), 6);
        let width = lines[0].len();
        assert!(lines.iter().all(|line| line.len() == width));
        assert!(lines[3].contains("us-east-1"));
    }

    #[test]
    fn test_table_header_wider_than_rows() {
        let rows = vec![("a".to_string(), "b".to_string())];
        let lines = render_pairs_table(("Service", "Endpoint"), &rows);
        assert_eq!(lines[1], " Service | Endpoint ");
    }

    #[test]
    fn test_json_output_is_pretty() {
        let rendered = format_json_output(&serde_json::json!({"eligible": false})).unwrap();
        assert_eq!(rendered, "{\n  \"eligible\": false\n}");
    }
}
