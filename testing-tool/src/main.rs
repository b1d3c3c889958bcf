use anyhow::{bail, Context, Result};
use colored::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const ACTOR: &str = "race-smoke";

/// Dispara N `POST /trips` simultáneos contra el mismo vehículo y conductor y
/// cuenta los resultados. Debe ganar exactamente uno.
#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚚 Fleet Dispatch - prueba de carrera".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let concurrency = ask_concurrency()?;

    let client = reqwest::Client::new();
    check_health(&client, &base_url).await?;

    let (vehicle_id, driver_id) = prepare_fleet(&client, &base_url).await?;
    println!("{} {}", "🚛 Vehículo:".bright_cyan(), vehicle_id);
    println!("{} {}", "👤 Conductor:".bright_cyan(), driver_id);
    println!();

    println!(
        "{}",
        format!("🏁 Lanzando {} despachos simultáneos...", concurrency)
            .bright_yellow()
            .bold()
    );
    let started = Instant::now();
    let mut handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("{}/trips", base_url);
        let body = json!({
            "vehicle_id": vehicle_id,
            "driver_id": driver_id,
            "cargo_weight_kg": 500,
        });
        handles.push(tokio::spawn(async move {
            let response = client
                .post(url)
                .header("x-actor-id", ACTOR)
                .json(&body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            Ok::<_, reqwest::Error>((status, body))
        }));
    }

    let mut tally: BTreeMap<String, usize> = BTreeMap::new();
    let mut winners = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok((status, body)) => {
                let reason = body["reason"].as_str().unwrap_or("-").to_string();
                if status == 201 {
                    if let Some(id) = body["trip"]["id"].as_str() {
                        winners.push(id.to_string());
                    }
                }
                *tally.entry(format!("{} {}", status, reason)).or_default() += 1;
            }
            Err(e) => {
                *tally.entry(format!("error de red: {}", e)).or_default() += 1;
            }
        }
    }

    println!();
    println!("{}", "📊 RESULTADOS".bright_green().bold());
    println!("{}", "=============".bright_green());
    for (outcome, count) in &tally {
        let line = format!("{:>4} × {}", count, outcome);
        if outcome.starts_with("201") {
            println!("{}", line.bright_green());
        } else if outcome.starts_with("409") {
            println!("{}", line.bright_yellow());
        } else {
            println!("{}", line.bright_red());
        }
    }
    println!("⏱️  {:?}", started.elapsed());
    println!();

    match winners.as_slice() {
        [trip_id] => {
            println!("{} {}", "✅ Exactamente un ganador:".bright_green().bold(), trip_id);
            cancel_trip(&client, &base_url, trip_id).await?;
            Ok(())
        }
        [] => bail!("ningún despacho tuvo éxito"),
        many => bail!("doble despacho: {} viajes creados", many.len()),
    }
}

fn ask_concurrency() -> Result<usize> {
    print!("{}", "Número de peticiones simultáneas (20): ".bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        return Ok(20);
    }
    let n: usize = input.parse().context("número inválido")?;
    if n < 2 {
        bail!("se necesitan al menos 2 peticiones para provocar una carrera");
    }
    Ok(n)
}

async fn check_health(client: &reqwest::Client, base_url: &str) -> Result<()> {
    let response = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .with_context(|| format!("servidor no disponible en {}", base_url))?;
    if !response.status().is_success() {
        bail!("health check devolvió {}", response.status());
    }
    println!("{}", "💚 Servidor disponible".bright_green());
    Ok(())
}

async fn post_json(client: &reqwest::Client, url: String, body: Value) -> Result<Value> {
    let response = client
        .post(&url)
        .header("x-actor-id", ACTOR)
        .json(&body)
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        bail!("{} falló con {}: {}", url, status, body);
    }
    Ok(body)
}

/// Alta de un vehículo y un conductor de usar y tirar
async fn prepare_fleet(client: &reqwest::Client, base_url: &str) -> Result<(String, String)> {
    let suffix = std::process::id();
    let vehicle = post_json(
        client,
        format!("{}/vehicles", base_url),
        json!({
            "registration": format!("RACE-{}", suffix),
            "service_due_km": 30000,
            "max_load_kg": 1000,
        }),
    )
    .await?;
    let driver = post_json(
        client,
        format!("{}/drivers", base_url),
        json!({
            "full_name": format!("Race Driver {}", suffix),
            "license_expiry": "2099-12-31",
        }),
    )
    .await?;

    let vehicle_id = vehicle["data"]["id"]
        .as_str()
        .context("respuesta de vehículo sin id")?
        .to_string();
    let driver_id = driver["data"]["id"]
        .as_str()
        .context("respuesta de conductor sin id")?
        .to_string();

    let response = client
        .patch(format!("{}/drivers/{}/status", base_url, driver_id))
        .header("x-actor-id", ACTOR)
        .json(&json!({ "status": "on_duty" }))
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("no se pudo poner al conductor en servicio: {}", response.status());
    }

    Ok((vehicle_id, driver_id))
}

async fn cancel_trip(client: &reqwest::Client, base_url: &str, trip_id: &str) -> Result<()> {
    post_json(
        client,
        format!("{}/trips/cancel", base_url),
        json!({ "trip_id": trip_id }),
    )
    .await?;
    println!("{}", "🧹 Viaje ganador cancelado, recursos liberados".bright_blue());
    Ok(())
}
