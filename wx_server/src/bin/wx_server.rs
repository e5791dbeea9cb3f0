/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::sync::Arc;

use clap::Parser;
use tonic::transport::Server as TonicServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wx_server::grpc::{ForecastServer, GrpcForecastService};
use wx_server::{http, load_config, AppState, Result, WxServerConfig};

#[derive(Parser, Debug)]
#[command(version, about = "NWP point-query server: axum HTTP + tonic gRPC adapters over the Query Engine")]
pub struct Args {
    /// serve the `GET /forecast` JSON endpoint
    #[arg(long, env = "HTTP")]
    pub http: bool,

    /// serve the `Forecast/GetForecast` gRPC service
    #[arg(long, env = "GRPC")]
    pub grpc: bool,

    #[arg(long, env = "HTTP_PORT", default_value_t = 8081)]
    pub http_port: u16,

    #[arg(long, env = "GRPC_PORT", default_value_t = 50051)]
    pub grpc_port: u16,

    /// wx_server.ron filename, looked up via WX_CONFIG_DIR/configs/<bin>/configs
    #[arg(long, env = "CONFIG", default_value = "wx_server.ron")]
    pub config: String,

    /// repeat for more verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn init_logging (verbose: u8) {
    let default_level = match verbose {
        0 => "wx_server=info",
        1 => "wx_server=debug",
        _ => "wx_server=trace,wx_query=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    wx_build::set_bin_context!();

    let args = Args::parse();
    init_logging(args.verbose);

    let cfg: WxServerConfig = load_config(&args.config)?;
    let state = Arc::new(AppState::new(&cfg));

    let serve_http = args.http || !args.grpc;
    let serve_grpc = args.grpc;

    let http_task = serve_http.then( || {
        let state = state.clone();
        let port = args.http_port;
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.expect("bind http listener");
            info!("http forecast adapter listening on :{port}");
            axum::serve(listener, http::router(state)).await.expect("http server");
        })
    });

    let grpc_task = serve_grpc.then( || {
        let state = state.clone();
        let port = args.grpc_port;
        tokio::spawn(async move {
            let addr = format!("0.0.0.0:{port}").parse().expect("grpc bind address");
            info!("grpc forecast adapter listening on :{port}");
            TonicServer::builder()
                .add_service(ForecastServer::new(GrpcForecastService { state }))
                .serve(addr).await.expect("grpc server");
        })
    });

    if let Some(task) = http_task { let _ = task.await; }
    if let Some(task) = grpc_task { let _ = task.await; }

    Ok(())
}
