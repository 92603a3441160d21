//! Static file serving module
//!
//! Maps request paths to files under the serving root and builds the
//! corresponding responses: file bytes with an inferred content type,
//! index files, generated directory listings, and the 403/404/500 mapping
//! for filesystem failures.

use crate::config::StaticFilesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Characters that cannot appear raw in a relative href attribute
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'\'')
    .add(b'?')
    .add(b'#')
    .add(b'%');

/// What a request path resolved to
#[derive(Debug)]
pub enum Resolution {
    /// A regular file: exact bytes plus inferred content type
    File {
        content: Vec<u8>,
        content_type: &'static str,
    },
    /// A generated listing for a directory with no index file
    Listing(String),
    /// Directory requested without a trailing slash
    Redirect(String),
    NotFound,
    Forbidden,
    /// Unexpected filesystem failure, reported as 500
    Failed(io::Error),
}

/// Serve a static file request
pub async fn serve(ctx: &RequestContext<'_>, cfg: &StaticFilesConfig) -> Response<Full<Bytes>> {
    match resolve(&cfg.root, ctx.path, &cfg.index_files).await {
        Resolution::File {
            content,
            content_type,
        } => http::response::build_file_response(Bytes::from(content), content_type, ctx.is_head),
        Resolution::Listing(html) => http::response::build_html_response(html, ctx.is_head),
        Resolution::Redirect(location) => http::build_redirect_response(&location),
        Resolution::NotFound => http::build_404_response(),
        Resolution::Forbidden => http::build_403_response(),
        Resolution::Failed(err) => {
            logger::log_error(&format!("Failed to serve '{}': {err}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Resolve a request path against the serving root
pub async fn resolve(root: &str, path: &str, index_files: &[String]) -> Resolution {
    // Decode before sanitizing, so encoded dot segments cannot sneak past
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let Some(relative) = sanitize_path(&decoded) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return Resolution::NotFound;
    };

    let full_path = Path::new(root).join(relative);

    let metadata = match fs::metadata(&full_path).await {
        Ok(m) => m,
        Err(e) => return classify_io_error(e),
    };

    if metadata.is_dir() {
        // Relative links in listings only resolve against a slash-terminated base
        if !decoded.ends_with('/') {
            return Resolution::Redirect(format!("{path}/"));
        }

        for index_file in index_files {
            let candidate = full_path.join(index_file);
            if candidate.is_file() {
                return load_file(root, &candidate).await;
            }
        }

        return render_listing(&decoded, &full_path).await;
    }

    load_file(root, &full_path).await
}

/// Turn a decoded request path into a root-relative path.
///
/// Empty and `.` segments are dropped; any `..` segment rejects the whole
/// path rather than being resolved.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment => clean.push(segment),
        }
    }
    Some(clean)
}

/// Read a file, enforcing that its canonical location stays under the root
async fn load_file(root: &str, file_path: &Path) -> Resolution {
    let root_canonical = match Path::new(root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Serving root not found or inaccessible '{root}': {e}"
            ));
            return classify_io_error(e);
        }
    };

    let file_canonical = match file_path.canonicalize() {
        Ok(p) => p,
        Err(e) => return classify_io_error(e),
    };

    // Symlinks must not lead outside the serving root
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Resolved path escapes the serving root: {}",
            file_canonical.display()
        ));
        return Resolution::NotFound;
    }

    match fs::read(&file_canonical).await {
        Ok(content) => {
            let content_type =
                mime::get_content_type(file_canonical.extension().and_then(|e| e.to_str()));
            Resolution::File {
                content,
                content_type,
            }
        }
        Err(e) => classify_io_error(e),
    }
}

/// Map filesystem errors to their HTTP meaning
fn classify_io_error(err: io::Error) -> Resolution {
    match err.kind() {
        io::ErrorKind::NotFound => Resolution::NotFound,
        io::ErrorKind::PermissionDenied => Resolution::Forbidden,
        _ => Resolution::Failed(err),
    }
}

/// Generate a listing for a directory with no index file
async fn render_listing(request_path: &str, dir: &Path) -> Resolution {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) => return classify_io_error(e),
    };

    let mut names = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => {
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                    name.push('/');
                }
                names.push(name);
            }
            Ok(None) => break,
            Err(e) => return classify_io_error(e),
        }
    }
    names.sort();

    Resolution::Listing(build_listing_html(request_path, &names))
}

/// Render the listing page: sorted entry names as hyperlinks, directories
/// marked with a trailing slash
fn build_listing_html(request_path: &str, names: &[String]) -> String {
    let title = format!("Directory listing for {request_path}");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{}</title>\n</head>\n<body>\n",
        escape_html(&title)
    ));
    html.push_str(&format!("<h1>{}</h1>\n<hr>\n<ul>\n", escape_html(&title)));
    for name in names {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_href(name),
            escape_html(name)
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

/// Escape entry names for HTML text and attribute positions
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Percent-encode an entry name for use as a relative href
fn encode_href(name: &str) -> String {
    utf8_percent_encode(name, HREF_ENCODE_SET).to_string()
}
