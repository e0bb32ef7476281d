//! Processing and download integration tests.
//!
//! Run with: `cargo test -p filekit-api --test process_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::{file_form, file_part, fixtures, setup_test_app, setup_test_app_with};
use image::ImageFormat;
use serde_json::Value;

#[tokio::test]
async fn test_pdf_to_text_end_to_end() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/process/pdf/pdf-to-text")
        .multipart(file_form("file", "hello.pdf", "application/pdf", fixtures::pdf("Hello", 1)))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "extracted_text.txt");
    let output_file = body["output_file"].as_str().unwrap().to_string();
    assert_ne!(output_file, "extracted_text.txt");
    assert_eq!(body["download_url"], format!("/download/{}", output_file));
    let preview = body["text_preview"].as_str().unwrap().to_string();
    assert!(preview.contains("Hello page 1"));

    // The upload is gone; only the output remains.
    assert_eq!(app.stored_files(), vec![output_file.clone()]);

    let download = client.get(&format!("/download/{}", output_file)).await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(
        download.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        download.headers()["content-disposition"],
        "attachment; filename=\"extracted_text.txt\""
    );
    let text = download.text();
    assert!(text.starts_with(preview.trim_end_matches("...")));
}

#[tokio::test]
async fn test_pdf_merge_keeps_all_pages() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = MultipartForm::new()
        .add_part("files", file_part("a.pdf", "application/pdf", fixtures::pdf("A", 2)))
        .add_part("files", file_part("b.pdf", "application/pdf", fixtures::pdf("B", 3)));
    let response = client.post("/process/pdf-merger").multipart(form).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["filename"], "merged_document.pdf");

    let download = client
        .get(body["download_url"].as_str().unwrap())
        .await;
    assert_eq!(download.headers()["content-type"], "application/pdf");
    let merged = lopdf::Document::load_mem(download.as_bytes()).unwrap();
    assert_eq!(merged.get_pages().len(), 5);
    assert!(merged.extract_text(&[3]).unwrap().contains("B page 1"));
}

#[tokio::test]
async fn test_image_convert_to_jpg() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/process/image/convert-jpg")
        .multipart(file_form("file", "photo.png", "image/png", fixtures::png(40, 30)))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["filename"], "converted_photo.jpg");

    let download = client.get(body["download_url"].as_str().unwrap()).await;
    assert_eq!(download.headers()["content-type"], "image/jpeg");
    assert_eq!(
        image::guess_format(download.as_bytes()).unwrap(),
        ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(download.as_bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[tokio::test]
async fn test_out_of_range_width_is_clamped() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = file_form("file", "tiny.png", "image/png", fixtures::png(8, 8))
        .add_text("width", "999999")
        .add_text("height", "3");
    let response = client.post("/process/image-resize").multipart(form).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let download = client.get(body["download_url"].as_str().unwrap()).await;
    let decoded = image::load_from_memory(download.as_bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (5000, 10));
}

#[tokio::test]
async fn test_pdf_splitter_returns_several_outputs() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/process/pdf/pdf-splitter")
        .multipart(file_form("file", "doc.pdf", "application/pdf", fixtures::pdf("S", 3)))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let outputs = body["output_files"].as_array().unwrap();
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0]["filename"], "doc_part_1.pdf");
    assert!(body.get("output_file").is_none());
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/pan-validator")
        .multipart(file_form("file", "a.pdf", "application/pdf", fixtures::pdf("X", 1)))
        .await;
    assert_eq!(response.status_code(), 404);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown tool");
    assert_eq!(body["code"], "UNKNOWN_TOOL");
}

#[tokio::test]
async fn test_category_mismatch_is_404() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/image/pdf-merger")
        .multipart(file_form("file", "a.pdf", "application/pdf", fixtures::pdf("X", 1)))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid category");
}

#[tokio::test]
async fn test_missing_file_is_400() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/pdf-to-text")
        .multipart(MultipartForm::new().add_text("note", "no upload here"))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_wrong_extension_is_rejected_without_saving() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/pdf-to-text")
        .multipart(file_form("file", "photo.png", "image/png", fixtures::png(4, 4)))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_merger_needs_two_files() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/pdf-merger")
        .multipart(file_form("files", "a.pdf", "application/pdf", fixtures::pdf("A", 1)))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_corrupt_input_is_422_and_input_deleted() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/process/pdf-rotate")
        .multipart(file_form("file", "junk.pdf", "application/pdf", b"not a pdf".to_vec()))
        .await;
    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_download_rejects_traversal_and_missing_files() {
    let app = setup_test_app().await;
    let client = app.client();

    let traversal = client.get("/download/..%2F..%2Fetc%2Fpasswd").await;
    assert_eq!(traversal.status_code(), 404);

    let missing = client.get("/download/does-not-exist.txt").await;
    assert_eq!(missing.status_code(), 404);
    let body: Value = missing.json();
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn test_oversized_upload_is_413_with_size_message() {
    let app = setup_test_app_with(|config| config.max_upload_size_mb = 1).await;
    let client = app.client();

    // Past the hard body cap (limit plus form overhead).
    let huge = client
        .post("/process/pdf-to-text")
        .multipart(file_form("file", "huge.pdf", "application/pdf", vec![b'x'; 3 * 1024 * 1024]))
        .await;
    assert_eq!(huge.status_code(), 413);
    let body: Value = huge.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"], "File too large. Maximum size is 1MB.");

    // Inside the body cap but over the file limit.
    let over = client
        .post("/process/pdf-to-text")
        .multipart(file_form(
            "file",
            "over.pdf",
            "application/pdf",
            vec![b'x'; 1024 * 1024 + 512 * 1024],
        ))
        .await;
    assert_eq!(over.status_code(), 413);
    let body: Value = over.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"], "File too large. Maximum size is 1MB.");

    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_pdf_that_breaks_text_extraction_is_422_and_server_survives() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/process/pdf-to-text")
        .multipart(file_form(
            "file",
            "bogus.pdf",
            "application/pdf",
            fixtures::pdf_with_bogus_encoding(),
        ))
        .await;
    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_FILE");
    assert!(app.stored_files().is_empty());

    let health = client.get("/health").await;
    assert_eq!(health.status_code(), 200);
}

#[tokio::test]
async fn test_non_ascii_border_color_falls_back_to_black() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = file_form("file", "photo.png", "image/png", fixtures::png(10, 10))
        .add_text("border_width", "2")
        .add_text("border_color", "aé123");
    let response = client.post("/process/image-border").multipart(form).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let download = client.get(body["download_url"].as_str().unwrap()).await;
    let decoded = image::load_from_memory(download.as_bytes()).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (14, 14));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[tokio::test]
async fn test_image_watermark_takes_one_image_and_text() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = file_form("file", "photo.png", "image/png", fixtures::png(300, 120))
        .add_text("watermark_text", "SAMPLE")
        .add_text("position", "center")
        .add_text("opacity", "1");
    let response = client.post("/process/image/image-watermark").multipart(form).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["filename"], "watermarked_photo.png");
    let download = client.get(body["download_url"].as_str().unwrap()).await;
    let decoded = image::load_from_memory(download.as_bytes()).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (300, 120));
    assert!(decoded.pixels().any(|p| p[1] > 200));
}
