//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port. The raw client is
//! driven over ureq, exactly as a host would execute the built requests; the
//! controller is driven over `ReqwestTransport`.

use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use todo_sync::{
    ApiError, Controller, Filter, HttpMethod, HttpResponse, Notice, RenameOutcome, SyncConfig, SyncError,
    TodoClient, UpdateTodo, UserId,
};

/// Start the mock server on a random port in a background thread.
fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: todo_sync::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

#[test]
fn client_crud_lifecycle() {
    let addr = spawn_server();
    let client = TodoClient::new(&format!("http://{addr}"), UserId(1));

    // Step 1: list, should be empty.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Step 2: create.
    let req = client.build_create_todo("Integration test").unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.user_id, UserId(1));
    assert!(!created.completed);
    let id = created.id;

    // Step 3: update title.
    let req = client.build_update_todo(id, &UpdateTodo::title("Updated title")).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(!updated.completed);

    // Step 4: update completed.
    let req = client.build_update_todo(id, &UpdateTodo::completed(true)).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(updated.completed);

    // Step 5: list, should have the one item.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos, vec![updated]);

    // Step 6: another user's list stays empty.
    let other = TodoClient::new(&format!("http://{addr}"), UserId(2));
    let todos = other.parse_list_todos(execute(other.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected other user's list to be empty");

    // Step 7: delete.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Step 8: delete again, NotFound.
    let err = client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: update after delete, NotFound.
    let req = client.build_update_todo(id, &UpdateTodo::completed(false)).unwrap();
    let err = client.parse_update_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 10: list, empty again.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");
}

#[tokio::test]
async fn controller_lifecycle_over_http() {
    let addr = spawn_server();
    let config = SyncConfig::new(format!("http://{addr}")).with_user(UserId(1));
    let controller = Controller::from_config(&config).unwrap();
    assert!(!controller.needs_user());

    controller.load().await.unwrap();
    assert!(controller.todos().is_empty());
    assert!(controller.all_completed());

    let milk = controller.add_todo("buy milk").await.unwrap();
    let dog = controller.add_todo("  walk dog ").await.unwrap();
    let mail = controller.add_todo("read mail").await.unwrap();
    assert_eq!(dog.title, "walk dog");
    assert_eq!(controller.pending(), None);

    controller.toggle_completed(milk.id).await.unwrap();
    controller.set_filter(Filter::Completed);
    assert_eq!(controller.visible().len(), 1);
    controller.set_filter(Filter::All);

    controller.toggle_all().await.unwrap();
    assert!(controller.all_completed());
    assert_eq!(controller.active_count(), 0);

    let outcome = controller.rename_todo(dog.id, "walk cat").await.unwrap();
    assert!(matches!(outcome, RenameOutcome::Renamed(ref todo) if todo.title == "walk cat"));

    assert_eq!(controller.rename_todo(mail.id, "").await.unwrap(), RenameOutcome::Deleted);

    controller.toggle_completed(dog.id).await.unwrap();
    controller.clear_completed().await.unwrap();

    let titles: Vec<String> = controller.todos().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["walk cat".to_string()]);
    assert!(controller.processing().is_empty());
    assert_eq!(controller.notice(), None);

    // A fresh controller for the same user sees exactly what the first one holds.
    let reloaded = Controller::from_config(&config).unwrap();
    reloaded.load().await.unwrap();
    assert_eq!(reloaded.todos(), controller.todos());
}

#[tokio::test]
async fn controller_surfaces_remote_failures() {
    let addr = spawn_server();
    let config = SyncConfig::new(format!("http://{addr}")).with_user(UserId(4));
    let first = Controller::from_config(&config).unwrap();
    let second = Controller::from_config(&config).unwrap();

    let todo = first.add_todo("shared").await.unwrap();
    second.load().await.unwrap();

    // The item disappears behind the second controller's back.
    first.delete_todo(todo.id).await.unwrap();

    let err = second.toggle_completed(todo.id).await.unwrap_err();
    assert_eq!(err, SyncError::Remote(ApiError::NotFound));
    assert_eq!(second.notice(), Some(Notice::UnableToUpdate));
    assert_eq!(second.todos(), vec![todo.clone()]);

    let err = second.delete_todo(todo.id).await.unwrap_err();
    assert_eq!(err, SyncError::Remote(ApiError::NotFound));
    assert_eq!(second.notice(), Some(Notice::UnableToDelete));
    assert_eq!(second.todos(), vec![todo]);
}

#[tokio::test]
async fn unreachable_service_fails_load() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = SyncConfig::new(format!("http://{addr}")).with_user(UserId(1));
    let controller = Controller::from_config(&config).unwrap();

    let err = controller.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(ApiError::Transport(_))));
    assert_eq!(controller.notice(), Some(Notice::UnableToLoad));
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn controller_without_user_stays_offline() {
    let controller = Controller::from_config(&SyncConfig::default()).unwrap();

    assert!(controller.needs_user());
    assert_eq!(controller.load().await, Err(SyncError::UserNotConfigured));
}
