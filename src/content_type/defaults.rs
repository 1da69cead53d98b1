/// Built-in extension table, seeded before any mapping file is read
pub(super) const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Images
    (".avif", "image/avif"),
    (".bmp", "image/bmp"),
    (".gif", "image/gif"),
    (".ico", "image/x-icon"),
    (".jpe", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".png", "image/png"),
    (".svg", "image/svg+xml"),
    (".svgz", "image/svg+xml"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".webp", "image/webp"),
    // Audio / video
    (".aac", "audio/aac"),
    (".flac", "audio/flac"),
    (".m4a", "audio/mp4"),
    (".mp3", "audio/mpeg"),
    (".oga", "audio/ogg"),
    (".ogg", "audio/ogg"),
    (".wav", "audio/wav"),
    (".avi", "video/x-msvideo"),
    (".m4v", "video/mp4"),
    (".mkv", "video/x-matroska"),
    (".mov", "video/quicktime"),
    (".mp4", "video/mp4"),
    (".mpeg", "video/mpeg"),
    (".ogv", "video/ogg"),
    (".webm", "video/webm"),
    // Web
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".js", "text/javascript"),
    (".json", "application/json"),
    (".map", "application/json"),
    (".mjs", "text/javascript"),
    (".txt", "text/plain"),
    (".wasm", "application/wasm"),
    (".xml", "text/xml"),
    // Fonts
    (".eot", "application/vnd.ms-fontobject"),
    (".otf", "font/otf"),
    (".ttf", "font/ttf"),
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    // Documents
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".epub", "application/epub+zip"),
    (".md", "text/markdown"),
    (".odp", "application/vnd.oasis.opendocument.presentation"),
    (".ods", "application/vnd.oasis.opendocument.spreadsheet"),
    (".odt", "application/vnd.oasis.opendocument.text"),
    (".pdf", "application/pdf"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".rtf", "application/rtf"),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    // Archives and binaries
    (".7z", "application/x-7z-compressed"),
    (".bin", "application/octet-stream"),
    (".bz2", "application/x-bzip2"),
    (".exe", "application/vnd.microsoft.portable-executable"),
    (".gz", "application/gzip"),
    (".ipa", "application/octet-stream"),
    (".rar", "application/vnd.rar"),
    (".tar", "application/x-tar"),
    (".zip", "application/zip"),
    // Platform packages
    (".apk", "application/vnd.android.package-archive"),
];
