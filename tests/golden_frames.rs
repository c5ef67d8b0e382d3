//! # Golden Frame Tests
//!
//! Byte-exact wire frames for the command templates. A change in any of
//! these means the device will see different bytes, so every expected frame
//! here is written out in full.

use novitus::CodePage;
use novitus::protocol::commands::{self, Command, ErrorHandling};
use novitus::protocol::frame::to_hex;
use novitus::receipt::{self, Item, Payment, PaymentType, ReceiptBegin, ReceiptClose};
use pretty_assertions::assert_eq;

fn hex(command: &Command, code_page: CodePage) -> String {
    to_hex(&command.encode(code_page).unwrap())
}

fn mazovia(command: &Command) -> String {
    hex(command, CodePage::Mazovia)
}

// ============================================================================
// DEVICE COMMANDS
// ============================================================================

#[test]
fn golden_raw_cash_in_frame() {
    let command = Command::new("#i").param("0").text("100/");
    assert_eq!(mazovia(&command), "1b 50 30 23 69 31 30 30 2f 39 42 1b 5c");
}

#[test]
fn golden_cash_in() {
    assert_eq!(
        mazovia(&commands::cash_in(100.0)),
        "1b 50 30 23 69 31 30 30 2e 30 30 2f 42 35 1b 5c"
    );
}

#[test]
fn golden_error_query() {
    assert_eq!(mazovia(&commands::error_query()), "1b 50 23 6e 42 32 1b 5c");
}

#[test]
fn golden_set_error_handling() {
    assert_eq!(
        mazovia(&commands::set_error_handling(ErrorHandling::Silent)),
        "1b 50 31 23 65 38 38 1b 5c"
    );
}

#[test]
fn golden_cash_register_data() {
    assert_eq!(
        mazovia(&commands::cash_register_data(commands::CASH_REGISTER_MODE)),
        "1b 50 32 31 23 73 41 43 1b 5c"
    );
    assert_eq!(
        mazovia(&commands::cash_register_data(commands::TAX_RATES_MODE)),
        "1b 50 32 32 23 73 41 46 1b 5c"
    );
}

#[test]
fn golden_open_drawer() {
    assert_eq!(mazovia(&commands::open_drawer()), "1b 50 31 24 64 38 45 1b 5c");
}

// ============================================================================
// RECEIPT
// ============================================================================

#[test]
fn golden_receipt_begin() {
    assert_eq!(
        mazovia(&ReceiptBegin::new().command()),
        "1b 50 30 3b 30 24 68 38 38 1b 5c"
    );
}

#[test]
fn golden_item() {
    let item = Item::new(1, "Kawa", 2.0, "A", 6.40).command();
    assert_eq!(
        mazovia(&item),
        "1b 50 31 24 6c 4b 61 77 61 0d 32 2e 30 30 2f 0d 41 2f 36 2e 34 30 2f 2f \
         31 32 2e 38 30 2f 2f 44 45 1b 5c"
    );
}

#[test]
fn golden_item_polish_name_per_code_page() {
    let item = Item::new(1, "Żurek", 1.0, "A", 12.0).command();
    assert_eq!(
        hex(&item, CodePage::Mazovia),
        "1b 50 31 24 6c a1 75 72 65 6b 0d 31 2e 30 30 2f 0d 41 2f 31 32 2e 30 30 2f 2f \
         31 32 2e 30 30 2f 2f 37 30 1b 5c"
    );
    assert_eq!(
        hex(&item, CodePage::Windows1250),
        "1b 50 31 24 6c af 75 72 65 6b 0d 31 2e 30 30 2f 0d 41 2f 31 32 2e 30 30 2f 2f \
         31 32 2e 30 30 2f 2f 37 45 1b 5c"
    );
}

#[test]
fn golden_discount() {
    assert_eq!(
        mazovia(&receipt::discount("Rabat", "10%")),
        "1b 50 31 24 6e 52 61 62 61 74 0d 31 30 2f 45 33 1b 5c"
    );
}

#[test]
fn golden_payment() {
    let payment = Payment::new(PaymentType::Card, 25.0).name("VISA").command();
    assert_eq!(
        mazovia(&payment),
        "1b 50 31 24 62 56 49 53 41 0d 32 35 2e 30 30 2f 38 45 1b 5c"
    );
}

#[test]
fn golden_receipt_close_and_cancel() {
    let close = ReceiptClose::new(12.80, "Jan").cash(20.0).command();
    assert_eq!(
        mazovia(&close),
        "1b 50 31 3b 30 24 65 4a 61 6e 0d 32 30 2e 30 30 2f 2f 31 32 2e 38 30 2f 2f \
         43 35 1b 5c"
    );
    assert_eq!(mazovia(&receipt::receipt_cancel()), "1b 50 30 24 65 38 45 1b 5c");
}
