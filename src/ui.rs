// UI utilities for the rotator CLI

use console::style;

use rpc_rotator::TransactionRecord;

/// Wei per gwei
const GWEI: u128 = 1_000_000_000;

/// Format a gas price for display (gwei with up to 3 decimals)
pub fn format_gas_price(wei: u128) -> String {
    // Below 0.001 gwei the gwei form rounds to zero
    if wei < GWEI / 1_000 {
        return format!("{} wei", format_with_commas(wei));
    }

    let whole = wei / GWEI;
    let frac = wei % GWEI;

    if frac == 0 {
        format!("{} gwei", format_with_commas(whole))
    } else {
        let frac_str = format!("{:09}", frac);
        let trimmed = frac_str.trim_end_matches('0');
        let decimals = if trimmed.len() > 3 {
            &trimmed[..3]
        } else {
            trimmed
        };
        format!("{}.{} gwei", format_with_commas(whole), decimals)
    }
}

/// Format number with commas for readability
pub fn format_with_commas(n: u128) -> String {
    let s = n.to_string();
    let chars: Vec<char> = s.chars().rev().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result.chars().rev().collect()
}

/// Print a horizontal line
pub fn print_line() {
    println!("{}", style("─".repeat(50)).dim());
}

/// Print a section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(title).cyan().bold());
    println!();
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{}", style(format!("  ⚠️  {}", message)).yellow());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{}", style(format!("  ❌ {}", message)).red());
}

/// Print the endpoint list, marking the selected one
pub fn print_endpoints(endpoints: &[String], selected: usize) {
    print_header("RPC endpoints");

    if endpoints.is_empty() {
        print_warning("No endpoints loaded");
        return;
    }

    for (i, url) in endpoints.iter().enumerate() {
        if i == selected {
            println!("  {} {:>2}  {}", style("▶").green(), i, style(url).green().bold());
        } else {
            println!("    {:>2}  {}", i, url);
        }
    }
    println!();
}

/// Print a human-readable summary of a transaction record
pub fn print_transaction(tx: &TransactionRecord) {
    print_header("Transaction");
    println!("  {:<10} {}", style("From:").dim(), tx.from);
    println!("  {:<10} {}", style("To:").dim(), tx.to);
    println!("  {:<10} {}", style("Nonce:").dim(), tx.nonce);
    println!("  {:<10} {}", style("Value:").dim(), format_with_commas(tx.value));
    if let Some(gas) = tx.gas {
        println!("  {:<10} {}", style("Gas:").dim(), format_with_commas(gas as u128));
    }
    if let Some(gas_price) = tx.gas_price {
        println!("  {:<10} {}", style("Gas price:").dim(), format_gas_price(gas_price));
    }
    if let Some(data) = &tx.data {
        println!("  {:<10} 0x{}", style("Data:").dim(), hex::encode(data));
    }
    print_line();
}
