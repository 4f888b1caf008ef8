//! End-to-end tests: `HttpLayouts` against a running server.

mod common;

use std::sync::Arc;

use seating_client::HttpLayouts;
use seating_core::{
    CanvasRect, Editor, ElementType, LayoutLibrary, LayoutRepository, PersistenceError, Point,
    PointerTarget,
};

use common::server::TestServer;

#[tokio::test]
async fn repository_operations_over_http() {
    let server = TestServer::start().await;
    let repo = HttpLayouts::new(server.api_url()).expect("client");

    assert!(repo.list_layout_names().await.expect("list").is_empty());

    let mut editor = Editor::default();
    editor.set_canvas_rect(CanvasRect::new(0.0, 0.0, 800.0, 600.0));
    editor.add_element(ElementType::Table).expect("table");
    let chair = editor.add_element(ElementType::Chair).expect("chair");

    let name = "Spring Gala / Hall B";
    repo.save_layout(name, &editor.snapshot()).await.expect("save");
    assert_eq!(
        repo.list_layout_names().await.expect("list"),
        vec![name.to_string()]
    );
    assert_eq!(repo.get_layout(name).await.expect("get"), editor.snapshot());

    repo.assign_guest_to_seat(name, chair, "Grace")
        .await
        .expect("assign");
    let loaded = repo.get_layout(name).await.expect("get");
    let seat = loaded.iter().find(|e| e.id == chair).expect("chair");
    assert_eq!(seat.guest(), Some("Grace"));

    repo.delete_layout(name).await.expect("delete");
    assert!(matches!(
        repo.get_layout(name).await,
        Err(PersistenceError::LayoutNotFound(_))
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn editor_saves_and_reloads_through_server() {
    let server = TestServer::start().await;
    let library = LayoutLibrary::new(Arc::new(
        HttpLayouts::new(server.api_url()).expect("client"),
    ));

    let mut editor = Editor::default();
    editor.set_canvas_rect(CanvasRect::new(0.0, 0.0, 800.0, 600.0));
    let table = editor.add_element(ElementType::Table).expect("table");
    editor.move_element(&table, 40.0, 50.0).expect("move");
    editor.save_to(&library, "Brunch").await.expect("save");
    assert!(server.data_dir().join("Brunch.json").exists());

    let mut other = Editor::default();
    other.set_canvas_rect(CanvasRect::new(0.0, 0.0, 800.0, 600.0));
    other.load_from(&library, "Brunch").await.expect("load");
    let element = other.scene().get(&table).expect("table");
    assert_eq!(element.transform.x, 40.0);
    assert_eq!(element.transform.y, 50.0);
    assert_eq!(
        other.hit_test(Point::new(50.0, 60.0)),
        PointerTarget::Element(table)
    );

    server.shutdown().await;
}
