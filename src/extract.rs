//! Best-effort plain-text body extraction from a parsed message.

use mail_parser::{Message, MessagePart, MimeHeaders, PartType};

use crate::html;

/// Extract a single plain-text body from a parsed message.
///
/// Single-part messages use their decoded payload directly, reduced from
/// HTML when that is what they carry. Multipart messages are walked in
/// full: attachment parts are skipped, text parts are bucketed as plain
/// or HTML by content type, and plain text always wins over HTML when
/// both exist. A message with no usable part yields an empty body; this
/// never fails.
pub fn extract_body(message: &Message<'_>) -> String {
    if message.parts.len() == 1 {
        return match &message.parts[0].body {
            PartType::Html(payload) => html::reduce(payload),
            PartType::Text(payload) => payload.trim().to_string(),
            _ => String::new(),
        };
    }

    let mut plain: Vec<&str> = Vec::new();
    let mut markup: Vec<&str> = Vec::new();

    for part in &message.parts {
        if is_attachment(part) {
            continue;
        }
        match &part.body {
            PartType::Text(payload) => plain.push(payload.as_ref()),
            PartType::Html(payload) => markup.push(payload.as_ref()),
            _ => {}
        }
    }

    if !plain.is_empty() {
        plain.join("\n").trim().to_string()
    } else if !markup.is_empty() {
        html::reduce(&markup.join("\n"))
    } else {
        String::new()
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .is_some_and(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_parser::MessageParser;

    fn parse(raw: &str) -> Message<'_> {
        MessageParser::default()
            .parse(raw.as_bytes())
            .expect("test message parses")
    }

    #[test]
    fn single_part_plain_text_is_trimmed() {
        let raw = "From: a@example.com\r\n\
                   Subject: hi\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   \r\n  Pay your bill  \r\n";
        assert_eq!(extract_body(&parse(raw)), "Pay your bill");
    }

    #[test]
    fn single_part_html_is_reduced() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <p>50% off!</p>\r\n";
        assert_eq!(extract_body(&parse(raw)), "50% off!");
    }

    #[test]
    fn plain_text_wins_over_html_in_multipart() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: multipart/alternative; boundary=\"b\"\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   the plain version\r\n\
                   --b\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <p>the html version</p>\r\n\
                   --b--\r\n";
        assert_eq!(extract_body(&parse(raw)), "the plain version");
    }

    #[test]
    fn html_used_when_no_plain_part_exists() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: multipart/mixed; boundary=\"b\"\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <div>only <b>markup</b> here</div>\r\n\
                   --b--\r\n";
        assert_eq!(extract_body(&parse(raw)), "only markup here");
    }

    #[test]
    fn multiple_plain_parts_join_with_newlines() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: multipart/mixed; boundary=\"b\"\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   first\r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   second\r\n\
                   --b--\r\n";
        assert_eq!(extract_body(&parse(raw)), "first\nsecond");
    }

    #[test]
    fn attachment_parts_are_skipped() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: multipart/mixed; boundary=\"b\"\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   the body\r\n\
                   --b\r\n\
                   Content-Type: text/plain\r\n\
                   Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
                   \r\n\
                   attached text that must not leak\r\n\
                   --b--\r\n";
        assert_eq!(extract_body(&parse(raw)), "the body");
    }

    #[test]
    fn message_with_no_usable_part_yields_empty_body() {
        let raw = "From: a@example.com\r\n\
                   Content-Type: multipart/mixed; boundary=\"b\"\r\n\
                   \r\n\
                   --b\r\n\
                   Content-Type: application/octet-stream\r\n\
                   Content-Transfer-Encoding: base64\r\n\
                   \r\n\
                   AAECAw==\r\n\
                   --b--\r\n";
        assert_eq!(extract_body(&parse(raw)), "");
    }
}
