use crate::helpers::spawn_app;

#[tokio::test]
async fn landing_page_renders() {
    let app = spawn_app().await;

    let resp = app.get_home("").await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/html; charset=utf-8"
    );

    let html = resp.text().await.unwrap();
    assert!(html.contains("<title>Engineers Hub - Coming Soon</title>"));
    assert!(html.contains(r#"<form action="/subscriptions" method="post""#));
    assert!(html.contains(r#"data-busy="false""#));
    assert!(html.contains("Be the first to know when we launch."));
}

#[tokio::test]
async fn nav_links_open_modal() {
    let app = spawn_app().await;

    let html = app.get_home("").await.text().await.unwrap();
    assert!(html.contains(r#"<a href="/?modal=info">Find Job</a>"#));
    assert!(!html.contains(r#"id="info-modal""#));

    let html = app.get_home("?modal=info").await.text().await.unwrap();
    assert!(html.contains(r#"id="info-modal""#));
}

#[tokio::test]
async fn mobile_menu_toggles() {
    let app = spawn_app().await;

    let html = app.get_home("").await.text().await.unwrap();
    assert!(html.contains(r#"href="/?menu=open""#));
    assert!(!html.contains(r#"id="mobile-menu""#));

    let html = app.get_home("?menu=open").await.text().await.unwrap();
    assert!(html.contains(r#"id="mobile-menu""#));
    // backdrop (outside click) leads back to the closed page
    assert!(html.contains(r#"<a class="backdrop" href="/""#));
}

#[tokio::test]
async fn unknown_query_params_are_ignored() {
    let app = spawn_app().await;
    let resp = app.get_home("?utm_source=twitter&menu=sideways").await;
    assert_eq!(resp.status().as_u16(), 200);
}
