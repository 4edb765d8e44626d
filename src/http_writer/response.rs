//! Operator-facing dumps of rejected responses.

use std::{
    fmt::Write as _,
    io::Read,
};

/// Maximum number of body bytes included in a dump.
pub const DUMP_BODY_LIMIT: u64 = 1024;

/// Render the status line, URL, headers and the start of the body.
pub(crate) fn dump_response(response: ureq::Response) -> String {
    let mut dump = format!(
        "{} {} {} from {}",
        response.http_version(),
        response.status(),
        response.status_text(),
        response.get_url(),
    );
    for name in response.headers_names() {
        for value in response.all(&name) {
            let _ = write!(dump, "\n{name}: {value}");
        }
    }

    let mut body = Vec::new();
    match response
        .into_reader()
        .take(DUMP_BODY_LIMIT)
        .read_to_end(&mut body)
    {
        Ok(0) => {}
        Ok(_) => {
            dump.push_str("\n\n");
            dump.push_str(&String::from_utf8_lossy(&body));
        }
        Err(err) => {
            let _ = write!(dump, "\n\n<unreadable body: {err}>");
        }
    }
    dump
}
