#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    sitios_reservas_server::run().await?;
    Ok(())
}
