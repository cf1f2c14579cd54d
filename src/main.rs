fn main() {
    if let Err(e) = plant_kpi_lib::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
