use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

/// Cliente mínimo contra un servidor en marcha
struct Api {
    client: reqwest::Client,
    base_url: String,
}

impl Api {
    async fn send(&self, method: reqwest::Method, path: &str, body: Option<&Value>) -> Result<(u16, Value)> {
        let url = format!("{}{}", self.base_url, path);
        println!("{} {} {}", "📤".bright_blue(), method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
        let status = response.status().as_u16();
        let value = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, value))
    }

    async fn expect_ok(&self, method: reqwest::Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let (status, value) = self.send(method, path, body).await?;
        if status != 200 {
            bail!("expected 200, got {}: {}", status, value);
        }
        Ok(value)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🕋 Hajj & Omra Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = match std::env::args().nth(1) {
        Some(url) => url,
        None => ask("URL del servidor (por defecto http://localhost:3000): ")?,
    };
    let base_url = if base_url.is_empty() { "http://localhost:3000".to_string() } else { base_url };
    let api = Api {
        client: reqwest::Client::new(),
        base_url: base_url.trim_end_matches('/').to_string(),
    };

    match run_scenario(&api).await {
        Ok(()) => {
            println!();
            println!("{}", "✅ Escenario completado".bright_green().bold());
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{} {}", "❌ Escenario fallido:".bright_red().bold(), e);
            Err(e)
        }
    }
}

fn ask(prompt: &str) -> Result<String> {
    print!("{}", prompt.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn program_body(doubles: i32) -> Value {
    json!({
        "name": "Smoke test Omra",
        "exchange": "3.75",
        "prixAvionDH": 7750,
        "prixVisaRiyal": 550,
        "profit": 1000,
        "nbJoursMadina": 4,
        "nbJoursMakkah": 10,
        "hotelsMadina": [
            { "name": "Smoke Hotel Madina", "chambres": { "2": { "nb": doubles, "prix": 800 } } }
        ],
        "hotelsMakkah": []
    })
}

fn count_rooms(detail: &Value) -> usize {
    detail["rooms"].as_array().map(|rooms| rooms.len()).unwrap_or(0)
}

fn str_field<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing field {} in {}", pointer, value))
}

/// Crear, reservar, crecer, reducir, cancelar y borrar
async fn run_scenario(api: &Api) -> Result<()> {
    use reqwest::Method;

    println!("{}", "🩺 1. Health check".bright_cyan().bold());
    api.expect_ok(Method::GET, "/health", None).await?;

    println!("{}", "📋 2. Crear programa con 2 dobles".bright_cyan().bold());
    let created = api.expect_ok(Method::POST, "/api/programs", Some(&program_body(2))).await?;
    let program_id = str_field(&created, "/data/program/id")?.to_string();
    let hotel_id = str_field(&created, "/data/hotelsMadina/0/id")?.to_string();
    println!("   {} habitaciones", count_rooms(&created["data"]));

    println!("{}", "💶 3. Presupuesto".bright_cyan().bold());
    let booking = json!({
        "programId": program_id,
        "roomType": 2,
        "gender": "Female",
        "madina": { "hotelId": hotel_id },
        "includeFlight": true,
        "includeVisa": true,
    });
    let quote = api.expect_ok(Method::POST, "/api/reservations/quote", Some(&booking)).await?;
    println!("   precio: {}", quote["data"]["price"]);

    println!("{}", "🧳 4. Reservar una plaza".bright_cyan().bold());
    let mut reservation = booking.clone();
    reservation["clientName"] = json!("Smoke Test");
    let booked = api.expect_ok(Method::POST, "/api/reservations", Some(&reservation)).await?;
    let reservation_id = str_field(&booked, "/data/reservation/id")?.to_string();

    println!("{}", "📈 5. Crecer a 5 dobles".bright_cyan().bold());
    let grown = api
        .expect_ok(Method::PUT, &format!("/api/programs/{}", program_id), Some(&program_body(5)))
        .await?;
    if count_rooms(&grown["data"]) != 5 {
        bail!("expected 5 rooms after growing, got {}", count_rooms(&grown["data"]));
    }

    println!("{}", "📉 6. Reducir a 0 dobles (la ocupada se conserva)".bright_cyan().bold());
    let shrunk = api
        .expect_ok(Method::PUT, &format!("/api/programs/{}", program_id), Some(&program_body(0)))
        .await?;
    if count_rooms(&shrunk["data"]) != 1 {
        bail!("expected the occupied room to survive, got {}", count_rooms(&shrunk["data"]));
    }
    if let Some(message) = shrunk["message"].as_str() {
        println!("   {}", message.bright_yellow());
    }

    println!("{}", "🗑️ 7. Cancelar la reserva y borrar el programa".bright_cyan().bold());
    api.expect_ok(Method::DELETE, &format!("/api/reservations/{}", reservation_id), None).await?;
    api.expect_ok(Method::DELETE, &format!("/api/programs/{}", program_id), None).await?;

    let (status, _) = api.send(Method::GET, &format!("/api/programs/{}", program_id), None).await?;
    if status != 404 {
        bail!("expected 404 for deleted program, got {}", status);
    }

    Ok(())
}
