use std::{
    borrow::Cow,
    fs,
    path::{Component, Path, PathBuf},
};

use tauri::http::{header::CONTENT_TYPE, Request, Response, StatusCode};
use url::Url;

use crate::{append_launcher_log, UI_PROTOCOL_SCHEME};

/// URL of `entry_document` as served by the UI scheme on this platform.
pub(crate) fn entry_url(entry_document: &str) -> Result<Url, String> {
    let raw = if cfg!(windows) {
        format!("http://{UI_PROTOCOL_SCHEME}.localhost/{entry_document}")
    } else {
        format!("{UI_PROTOCOL_SCHEME}://localhost/{entry_document}")
    };
    Url::parse(&raw).map_err(|error| format!("Invalid UI entry url '{raw}': {error}"))
}

/// Maps a request path onto a file below `ui_root`; `None` for paths that
/// would escape it.
pub(crate) fn resolve_asset_path(
    ui_root: &Path,
    request_path: &str,
    entry_document: &str,
) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        entry_document
    } else {
        relative
    };

    let mut resolved = ui_root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

pub(crate) fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

fn respond(status: StatusCode, content_type: &str, body: Vec<u8>) -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Cow::Owned(body))
        .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[][..])))
}

pub(crate) fn serve_ui_asset(
    ui_root: &Path,
    entry_document: &str,
    request: &Request<Vec<u8>>,
) -> Response<Cow<'static, [u8]>> {
    let request_path = request.uri().path();
    let Some(asset_path) = resolve_asset_path(ui_root, request_path, entry_document) else {
        append_launcher_log(&format!("rejected ui asset outside root: {request_path}"));
        return respond(StatusCode::FORBIDDEN, "text/plain", b"forbidden".to_vec());
    };

    match fs::read(&asset_path) {
        Ok(bytes) => respond(StatusCode::OK, mime_type_for(&asset_path), bytes),
        Err(error) => {
            append_launcher_log(&format!(
                "ui asset {} unavailable: {}",
                asset_path.display(),
                error
            ));
            respond(StatusCode::NOT_FOUND, "text/plain", b"not found".to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> Request<Vec<u8>> {
        Request::builder()
            .uri(format!("xlabs://localhost{path}"))
            .body(Vec::new())
            .expect("build request")
    }

    #[test]
    fn entry_url_uses_ui_scheme() {
        let url = entry_url("main.html").expect("entry url");
        assert!(url.as_str().contains("xlabs"));
        assert!(url.path().ends_with("/main.html"));
    }

    #[test]
    fn resolve_asset_path_defaults_to_entry_document() {
        let root = Path::new("/ui");
        assert_eq!(
            resolve_asset_path(root, "/", "main.html"),
            Some(PathBuf::from("/ui/main.html"))
        );
        assert_eq!(
            resolve_asset_path(root, "/assets/./app.js", "main.html"),
            Some(PathBuf::from("/ui/assets/app.js"))
        );
    }

    #[test]
    fn resolve_asset_path_rejects_parent_traversal() {
        assert_eq!(
            resolve_asset_path(Path::new("/ui"), "/../user/properties.json", "main.html"),
            None
        );
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for(Path::new("main.HTML")), "text/html; charset=utf-8");
        assert_eq!(mime_type_for(Path::new("app.js")), "text/javascript; charset=utf-8");
        assert_eq!(mime_type_for(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn serve_ui_asset_reads_files_and_reports_missing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("main.html"), "<html></html>").expect("write entry");

        let found = serve_ui_asset(dir.path(), "main.html", &get("/main.html"));
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(&found.body()[..], b"<html></html>");
        assert_eq!(
            found.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
            Some("text/html; charset=utf-8")
        );

        let missing = serve_ui_asset(dir.path(), "main.html", &get("/missing.css"));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
