//! Landing page module
//!
//! The root path always answers with this fixed banner, even when the
//! serving root contains its own `index.html`. The page advertises the
//! backend API endpoint; this server never calls it, it only links to it.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::handler::router::RequestContext;
use crate::logger;

/// Served byte-for-byte for `GET /`
pub const LANDING_PAGE_HTML: &str = "<html>\n\
<body>\n\
<h1>Not a Label - Working!</h1>\n\
<p>The server is accessible at port 3000</p>\n\
<p>Backend API: <a href=\"http://localhost:4000/__test\">http://localhost:4000/__test</a></p>\n\
</body>\n\
</html>\n";

/// Landing page bytes, shared without copying
pub fn page_bytes() -> Bytes {
    Bytes::from_static(LANDING_PAGE_HTML.as_bytes())
}

/// Build the landing page response
pub fn serve(ctx: &RequestContext<'_>, page: &Bytes) -> Response<Full<Bytes>> {
    let body = if ctx.is_head { Bytes::new() } else { page.clone() };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html")
        .header("Content-Length", page.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build landing page response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}
