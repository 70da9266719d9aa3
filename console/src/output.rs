//! Plain-text rendering for the terminal

use jifeng_core::{ExchangeRecord, PointsRecord, Product, Unavailability};
use jifeng_engine::{Notice, NoticeLevel};

pub fn print_notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    eprintln!("[{}] {}: {}", tag, notice.title, notice.detail);
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        print_notice(notice);
    }
}

fn availability(product: &Product) -> String {
    match product.unavailable_reason() {
        None => format!("{} left this month", product.remaining()),
        Some(Unavailability::OutOfStock) => "out of stock".to_string(),
        Some(Unavailability::MonthlyLimitReached) => "monthly limit reached".to_string(),
    }
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    println!(
        "{:<10} {:<24} {:>8} {:>7} {:>9}  {}",
        "ID", "NAME", "POINTS", "STOCK", "LIMIT", "AVAILABILITY"
    );
    for p in products {
        println!(
            "{:<10} {:<24} {:>8} {:>7} {:>4}/{:<4}  {}",
            p.id,
            p.name,
            p.points,
            p.stock,
            p.used_this_month,
            p.monthly_limit,
            availability(p)
        );
    }
}

/// Admin listing includes the online/offline status
pub fn print_admin_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    println!(
        "{:<10} {:<24} {:>8} {:>7} {:>6}  {}",
        "ID", "NAME", "POINTS", "STOCK", "LIMIT", "STATUS"
    );
    for p in products {
        let status = p
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<24} {:>8} {:>7} {:>6}  {}",
            p.id, p.name, p.points, p.stock, p.monthly_limit, status
        );
    }
}

/// Member view of a single product
pub fn print_product_detail(product: &Product) {
    println!("{} ({})", product.name, product.id);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    println!(
        "  {} points, stock {}, used {}/{} this month: {}",
        product.points,
        product.stock,
        product.used_this_month,
        product.monthly_limit,
        availability(product)
    );
}

pub fn print_product(label: &str, product: &Product) {
    println!(
        "{} {} ({}): {} points, stock {}, monthly limit {}",
        label, product.name, product.id, product.points, product.stock, product.monthly_limit
    );
}

pub fn print_points_records(records: &[PointsRecord]) {
    if records.is_empty() {
        println!("No records in this period.");
        return;
    }
    for r in records {
        println!(
            "{}  {:>+7}  balance {:>7}  {}",
            r.date.format("%Y-%m-%d %H:%M"),
            r.signed_points(),
            r.balance,
            r.description.as_deref().unwrap_or("")
        );
    }
}

pub fn print_exchange_records(records: &[ExchangeRecord]) {
    if records.is_empty() {
        println!("No exchange records.");
        return;
    }
    for r in records {
        let who = r
            .nickname
            .as_deref()
            .or(r.username.as_deref())
            .unwrap_or(&r.user_id);
        let product = r.product_name.as_deref().unwrap_or(&r.product_id);
        println!(
            "{}  {:<12} {:<24} x{:<3} {:>7} pts  {}{}",
            r.created_at.format("%Y-%m-%d %H:%M"),
            who,
            product,
            r.quantity,
            r.points,
            r.status,
            r.coupon_code
                .as_deref()
                .map(|c| format!("  coupon {}", c))
                .unwrap_or_default()
        );
    }
}
