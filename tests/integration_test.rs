//! Browser-backed integration tests
//!
//! These need a local Chrome/Chromium (set CHROME_EXECUTABLE if it is
//! not on the usual paths) and are ignored by default:
//! `cargo test -- --ignored`

use std::io::Cursor;
use std::time::{Duration, Instant};

use pdf_lote::{logger, BatchOrchestrator, Config, RenderItem, RenderSession};
use zip::ZipArchive;

fn test_config() -> Config {
    let mut config = Config::from_env();
    config.max_concurrent_pages = 2;
    config
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[tokio::test]
#[ignore]
async fn batch_round_trip_produces_expected_entries() {
    logger::init(true);

    let items = vec![
        RenderItem::new("<html><body><h1>Notificação 1</h1></body></html>", Some("cliente-a")),
        RenderItem::new("<html><body><h1>Notificação 2</h1></body></html>", None),
        RenderItem::new("<html><body><h1>Notificação 3</h1></body></html>", Some("cliente-c.pdf")),
    ];

    let orchestrator = BatchOrchestrator::new(test_config());
    let archive = orchestrator.run(items).await.expect("batch should succeed");

    assert_eq!(
        entry_names(&archive),
        vec!["cliente-a.pdf", "documento.pdf", "cliente-c.pdf"]
    );

    // every entry is a real PDF
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    for i in 0..zip.len() {
        use std::io::Read;
        let mut entry = zip.by_index(i).unwrap();
        let mut head = [0u8; 5];
        entry.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"%PDF-");
    }
}

#[tokio::test]
#[ignore]
async fn one_bad_item_does_not_abort_the_batch() {
    logger::init(true);

    let items = vec![
        RenderItem::new("<html><body>ok 1</body></html>", Some("ok-1")),
        RenderItem::new("   ", Some("em-branco")),
        RenderItem::new("<html><body>ok 2</body></html>", Some("ok-2")),
    ];

    let orchestrator = BatchOrchestrator::new(test_config());
    let archive = orchestrator.run(items).await.expect("batch should succeed");

    assert_eq!(entry_names(&archive), vec!["ok-1.pdf", "ok-2.pdf"]);
}

#[tokio::test]
#[ignore]
async fn unreachable_image_is_bounded_by_the_wait_ceiling() {
    logger::init(true);

    let mut config = test_config();
    config.cold_resource_wait = Duration::from_secs(3);

    let html = r#"<html><body>
        <p>corpo da notificação</p>
        <img src="http://10.255.255.1/nunca-carrega.png">
    </body></html>"#;

    let mut session = RenderSession::launch(&config).await.expect("launch");
    let mut page = session.new_page().await.expect("page");

    let start = Instant::now();
    let pdf = page.render_pdf(html, 0).await.expect("render should not stall");
    let elapsed = start.elapsed();

    assert!(pdf.starts_with(b"%PDF-"));
    // ceiling plus generous slack for load + export themselves
    assert!(
        elapsed < config.cold_resource_wait + Duration::from_secs(5),
        "render took {:?}, expected the wait to be bounded",
        elapsed
    );

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn page_reuse_keeps_the_session_usable_across_items() {
    logger::init(true);

    let config = test_config();
    let mut session = RenderSession::launch(&config).await.expect("launch");
    let mut page = session.new_page().await.expect("page");
    assert!(!page.is_warm());

    let first = page.render_pdf("<html><body>um</body></html>", 0).await.expect("first");
    assert!(page.is_warm());
    let second = page.render_pdf("<html><body>dois</body></html>", 1).await.expect("second");

    assert!(first.starts_with(b"%PDF-"));
    assert!(second.starts_with(b"%PDF-"));

    session.close().await;
    // idempotent
    session.close().await;
    assert!(!session.is_alive());
}
