use http::header::{HeaderValue, SERVER};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use trellis::middleware::{self, ErrorPage, Next, from_fn};
use trellis::{App, Context, Router, Server, health};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), trellis::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let router = Router::new()
        .get("/", index)?
        .get("/users/:id([0-9]+)", get_user)?
        .get("/users/:id([0-9]+)/posts/:slug", get_post)?
        .post("/users", create_user)?
        .get("/static/*", static_files)?
        .get("/healthz", health::liveness)?
        .get("/readyz", health::readiness)?;

    let app = App::new(router)
        .wrap(middleware::trace())
        .wrap(from_fn(server_header))
        .wrap(ErrorPage::with_defaults());

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

async fn server_header(ctx: Context, next: Next) -> Context {
    let mut ctx = next.run(ctx).await;
    ctx.set_header(SERVER, HeaderValue::from_static("trellis"));
    ctx
}

async fn index(mut ctx: Context) -> Context {
    ctx.text("trellis demo");
    ctx
}

async fn get_user(mut ctx: Context) -> Context {
    match ctx.path_value_as::<u64>("id") {
        Ok(id) => {
            let user = User { id, name: format!("user-{id}") };
            let _ = ctx.json_ok(&user);
        }
        Err(_) => ctx.set_status(StatusCode::BAD_REQUEST),
    }
    ctx
}

async fn get_post(mut ctx: Context) -> Context {
    let id = ctx.path_value("id").unwrap_or_default().to_owned();
    let slug = ctx.path_value("slug").unwrap_or_default().to_owned();
    ctx.text(format!("post {slug} by user {id}"));
    ctx
}

async fn create_user(mut ctx: Context) -> Context {
    match ctx.bind_json::<User>() {
        Ok(user) => {
            let _ = ctx.json(StatusCode::CREATED, &user);
        }
        Err(_) => ctx.set_status(StatusCode::UNPROCESSABLE_ENTITY),
    }
    ctx
}

async fn static_files(mut ctx: Context) -> Context {
    let path = ctx.path().to_owned();
    ctx.text(format!("would serve {path}"));
    ctx
}
