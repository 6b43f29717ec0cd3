fn main() {
    if let Err(err) = ecs_schema_sync::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
