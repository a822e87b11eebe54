//! Walk a headless session through the main user flows and print what a UI would show.
//!
//! ```bash
//! cargo run -p xizoa-core --example session_walkthrough
//! ```

use xizoa_core::{
    AppConfig, Command, CommandResult, HeadlessSurface, MemoryStore, MemoryTransport, Session,
};

fn print_view(session: &Session<HeadlessSurface, MemoryStore, MemoryTransport>) {
    let view = session.presentation();
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|t| {
            if t.is_active {
                format!("[{}]", t.name)
            } else {
                t.name.clone()
            }
        })
        .collect();
    println!("tabs: {}  | status: {}", tabs.join(" "), session.status());
}

fn main() {
    let mut session = Session::new(
        AppConfig::default().with_env_overrides(),
        HeadlessSurface::new(),
        MemoryStore::new(),
        MemoryTransport::new(),
    );

    let outcome = session.dispatch(Command::Unlock {
        password: "guess".to_string(),
    });
    println!("wrong password -> {:?}", outcome.notice);

    let password = session.config().password.clone();
    session.dispatch(Command::Unlock { password });
    print_view(&session);

    session.dispatch(Command::NewFile {
        name: "about.html".to_string(),
    });
    session
        .surface_mut()
        .type_text("<html><head></head><body><p>about</p></body></html>");
    session.dispatch(Command::ContentChanged);
    print_view(&session);

    session.dispatch(Command::OpenFile {
        name: "index.html".to_string(),
    });
    if let Some(CommandResult::Preview(doc)) = session.dispatch(Command::Run).result {
        println!("preview:\n{}", doc.markup());
    }

    session.dispatch(Command::Save);
    if let Some(CommandResult::Exported(blob)) = session.dispatch(Command::Export).result {
        println!("export {} ({} bytes)", blob.filename, blob.bytes.len());
    }
    print_view(&session);
}
