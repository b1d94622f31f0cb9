//! Walks one instance through its whole lifecycle against an `httpmock` stand-in for the
//! RabbitMQ management API, talking to a real broker listener over HTTP.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use tokio::{net::TcpListener, sync::oneshot};
// self
use rabbitmq_broker::{
	api::{self, AppState},
	config::{BrokerConfig, GateCredentials, ManagementConfig},
	reqwest::{Client, Method},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let rabbitmq = MockServer::start_async().await;

	rabbitmq
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).header("content-type", "application/json").body(r#"{"status":"ok"}"#);
		})
		.await;
	rabbitmq
		.mock_async(|when, then| {
			when.method(PUT);
			then.status(201);
		})
		.await;
	rabbitmq
		.mock_async(|when, then| {
			when.method(DELETE);
			then.status(204);
		})
		.await;

	let config = BrokerConfig::new(
		GateCredentials::new("tsuru", "tsuru-secret"),
		ManagementConfig::new(rabbitmq.host(), rabbitmq.port(), "guest", "guest"),
		5672,
		"demo-salt",
	);
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let base = format!("http://{}", listener.local_addr()?);
	let (stop, stopped) = oneshot::channel::<()>();
	let server = tokio::spawn(api::serve(listener, AppState::from_config(&config)?, async move {
		let _ = stopped.await;
	}));
	let http = Client::new();
	let call = |method: Method, path: &str| {
		http.request(method, format!("{base}{path}")).basic_auth("tsuru", Some("tsuru-secret"))
	};

	let created = call(Method::POST, "/resources")
		.form(&[("name", "orders")])
		.send()
		.await?;

	println!("create instance: {}", created.status());

	let bound = call(Method::POST, "/resources/orders/bind-app")
		.form(&[("app-host", "orders.apps.example.com")])
		.send()
		.await?;

	println!("bind app: {} {}", bound.status(), bound.text().await?);

	let status = call(Method::GET, "/resources/orders/status").send().await?;

	println!("status: {}", status.status());

	let unbound = call(Method::DELETE, "/resources/orders/bind-app")
		.form(&[("app-host", "orders.apps.example.com")])
		.send()
		.await?;

	println!("unbind app: {}", unbound.status());

	let deleted = call(Method::DELETE, "/resources/orders").send().await?;

	println!("delete instance: {}", deleted.status());

	let _ = stop.send(());

	server.await??;

	Ok(())
}
