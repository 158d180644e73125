use shader_labs::Lab;

fn print_labs() {
    println!("Usage: shader-labs [lab]");
    println!();
    println!("Available labs:");
    for lab in Lab::ALL {
        println!("    {:<16} lab{:02}", lab.name(), lab.number());
    }
}

fn main() -> anyhow::Result<()> {
    let lab = match std::env::args().nth(1) {
        Some(arg) if arg == "-h" || arg == "--help" => {
            print_labs();
            return Ok(());
        }
        Some(arg) => match arg.parse::<Lab>() {
            Ok(lab) => lab,
            Err(e) => {
                print_labs();
                return Err(e);
            }
        },
        None => Lab::Transformations,
    };

    shader_labs::run_lab(lab)
}
