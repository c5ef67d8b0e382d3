//! # Fiscal Document Builders
//!
//! Builders for the commands that make up a receipt or an invoice. Each
//! builder produces a [`Command`] ready to be encoded; nothing here touches
//! the transport.
//!
//! A typical receipt is a fixed sequence:
//!
//! ```
//! use novitus::receipt::{Item, ReceiptBegin, ReceiptClose};
//!
//! let begin = ReceiptBegin::new().command();
//! let item = Item::new(1, "Kawa", 2.0, "A", 6.40).command();
//! let close = ReceiptClose::new(12.80, "Jan").cash(20.0).command();
//!
//! assert_eq!(begin.body(), "0;0$h");
//! assert_eq!(item.body(), "1$lKawa\r2.00/\rA/6.40//12.80//");
//! assert_eq!(close.body(), "1;0$eJan\r20.00//12.80//");
//! ```
//!
//! Optional blocks are positional: the device counts fields, so each one is
//! appended exactly where the layout expects it or not at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::commands::{Command, opcode};
use crate::protocol::grammar::{ValueKind, line};

/// Default description id for a per-item discount.
pub const DEFAULT_DISCOUNT_DESCRIPTION: u32 = 16;

// ============================================================================
// ITEMS
// ============================================================================

/// # Item Line (`$l`)
///
/// One sold item. The line total sent to the device is `price * quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    line_number: u32,
    name: String,
    quantity: f64,
    ptu: String,
    price: f64,
    plu: Option<String>,
    description: Option<String>,
    discount: Option<ItemDiscount>,
}

#[derive(Debug, Clone, PartialEq)]
struct ItemDiscount {
    name: String,
    value: String,
    description_id: u32,
}

impl Item {
    pub fn new(
        line_number: u32,
        name: impl Into<String>,
        quantity: f64,
        ptu: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            line_number,
            name: name.into(),
            quantity,
            ptu: ptu.into(),
            price,
            plu: None,
            description: None,
            discount: None,
        }
    }

    /// Product code printed under the name.
    pub fn plu(mut self, plu: impl Into<String>) -> Self {
        self.plu = Some(plu.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Extra description line.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Attach a discount to this item. `value` is `"10%"` or an amount.
    pub fn discount(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.discount = Some(ItemDiscount {
            name: name.into(),
            value: value.into(),
            description_id: DEFAULT_DISCOUNT_DESCRIPTION,
        });
        self
    }

    /// Override the discount description id (has no effect without a discount).
    pub fn discount_description(mut self, description_id: u32) -> Self {
        if let Some(discount) = &mut self.discount {
            discount.description_id = description_id;
        }
        self
    }

    pub fn total(&self) -> f64 {
        self.price * self.quantity
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(opcode::ITEM).param(self.line_number.to_string());
        cmd.push_text(line(&self.name));

        if let Some(plu) = &self.plu {
            cmd.push_text(line(plu));
        }

        cmd.push_number(self.quantity);
        cmd.push_text("\r");
        cmd.push_text(format!("{}/", self.ptu));
        cmd.push_number(self.price);
        cmd.push_text("/");
        cmd.push_number(self.total());
        cmd.push_text("/");

        if let Some(discount) = &self.discount {
            let (_, value) = ValueKind::parse(&discount.value);
            cmd.push_param("2;");
            cmd.push_param(discount.description_id.to_string());
            cmd.push_text(line(value));
            cmd.push_text(line(&discount.name));
        }

        if let Some(description) = &self.description {
            cmd.push_param("1;");
            cmd.push_text(line(description));
        }

        cmd
    }
}

// ============================================================================
// DISCOUNTS AND MARKUPS
// ============================================================================

/// # Receipt Discount (`$n`)
///
/// Applies to the receipt subtotal. A trailing `%` makes it relative.
pub fn discount(name: &str, value: &str) -> Command {
    let (kind, value) = ValueKind::parse(value);
    let mode = match kind {
        ValueKind::Percent => "1",
        ValueKind::Amount => "3",
    };
    adjustment(mode, name, value)
}

/// # Receipt Markup (`$n`)
pub fn markup(name: &str, value: &str) -> Command {
    let (kind, value) = ValueKind::parse(value);
    let mode = match kind {
        ValueKind::Percent => "2",
        ValueKind::Amount => "4",
    };
    adjustment(mode, name, value)
}

fn adjustment(mode: &str, name: &str, value: &str) -> Command {
    Command::new(opcode::DISCOUNT)
        .param(mode)
        .text(line(name))
        .text(format!("{}/", value))
}

// ============================================================================
// PAYMENTS
// ============================================================================

/// Form of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Card,
    Cheque,
    Voucher,
    Credit,
    Transfer,
    Other,
}

impl PaymentType {
    pub fn code(self) -> &'static str {
        match self {
            PaymentType::Cash => "0",
            PaymentType::Card => "1",
            PaymentType::Cheque => "2",
            PaymentType::Voucher => "3",
            PaymentType::Credit => "4",
            PaymentType::Transfer => "5",
            PaymentType::Other => "6",
        }
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentType::Cash),
            "card" => Ok(PaymentType::Card),
            "cheque" | "check" => Ok(PaymentType::Cheque),
            "voucher" => Ok(PaymentType::Voucher),
            "credit" => Ok(PaymentType::Credit),
            "transfer" => Ok(PaymentType::Transfer),
            "other" => Ok(PaymentType::Other),
            other => Err(format!("Unknown payment type '{}'", other)),
        }
    }
}

/// # Payment (`$b`)
///
/// Layout not yet checked against a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    kind: PaymentType,
    amount: f64,
    name: String,
}

impl Payment {
    pub fn new(kind: PaymentType, amount: f64) -> Self {
        Self {
            kind,
            amount,
            name: String::new(),
        }
    }

    /// Label printed next to the payment (card brand, voucher name).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn command(&self) -> Command {
        Command::new(opcode::PAYMENT)
            .param(self.kind.code())
            .text(line(&self.name))
            .number(self.amount)
    }
}

// ============================================================================
// RECEIPTS
// ============================================================================

/// Buyer tax identifier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuyerIdentifier {
    #[default]
    Nip,
    Regon,
    Pesel,
}

impl BuyerIdentifier {
    pub fn code(self) -> &'static str {
        match self {
            BuyerIdentifier::Nip => "1",
            BuyerIdentifier::Regon => "2",
            BuyerIdentifier::Pesel => "3",
        }
    }
}

impl fmt::Display for BuyerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuyerIdentifier::Nip => "NIP",
            BuyerIdentifier::Regon => "REGON",
            BuyerIdentifier::Pesel => "PESEL",
        })
    }
}

impl FromStr for BuyerIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NIP" => Ok(BuyerIdentifier::Nip),
            "REGON" => Ok(BuyerIdentifier::Regon),
            "PESEL" => Ok(BuyerIdentifier::Pesel),
            other => Err(format!("Unknown buyer identifier type '{}'", other)),
        }
    }
}

/// # Begin Receipt (`$h`)
///
/// `lines_count` of `0` means the device prints items online as they arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptBegin {
    lines_count: u32,
    system_identifier: Option<String>,
    additional_lines: Vec<String>,
    buyer: Option<(BuyerIdentifier, String)>,
}

impl ReceiptBegin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_count(mut self, count: u32) -> Self {
        self.lines_count = count;
        self
    }

    /// System identifier, printed as the first additional line.
    pub fn system_identifier(mut self, id: impl Into<String>) -> Self {
        self.system_identifier = Some(id.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.additional_lines.push(text.into());
        self
    }

    /// Print the buyer's tax identifier on the receipt.
    pub fn buyer(mut self, kind: BuyerIdentifier, id: impl Into<String>) -> Self {
        let id = id.into();
        self.buyer = if id.is_empty() { None } else { Some((kind, id)) };
        self
    }

    pub fn command(&self) -> Command {
        let lines: Vec<&str> = self
            .system_identifier
            .iter()
            .chain(&self.additional_lines)
            .map(String::as_str)
            .collect();

        let mut cmd = Command::new(opcode::RECEIPT_BEGIN)
            .param(self.lines_count.to_string())
            .param(";")
            .param(lines.len().to_string());
        for text in &lines {
            cmd.push_text(line(text));
        }

        if let Some((kind, id)) = &self.buyer {
            cmd.push_param(";0;");
            cmd.push_param(kind.code());
            cmd.push_param(";");
            cmd.push_param("1");
            cmd.push_text(line(id));
        }

        cmd
    }
}

/// # Cancel Receipt (`$e`)
pub fn receipt_cancel() -> Command {
    Command::new(opcode::DOCUMENT_END).param("0")
}

/// # Close Receipt (`$e`)
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptClose {
    total: f64,
    cashier: String,
    discount: f64,
    cash: f64,
}

impl ReceiptClose {
    pub fn new(total: f64, cashier: impl Into<String>) -> Self {
        Self {
            total,
            cashier: cashier.into(),
            discount: 0.0,
            cash: 0.0,
        }
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Cash tendered by the customer.
    pub fn cash(mut self, cash: f64) -> Self {
        self.cash = cash;
        self
    }

    pub fn command(&self) -> Command {
        Command::new(opcode::DOCUMENT_END)
            .param("1;")
            .param_number(self.discount)
            .text(line(&self.cashier))
            .number(self.cash)
            .text("/")
            .number(self.total)
            .text("/")
    }
}

// ============================================================================
// INVOICES
// ============================================================================

/// # Begin Invoice (`$f`)
///
/// Layout not yet checked against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceBegin {
    number: String,
    copies: u32,
    buyer_lines: Vec<String>,
    buyer: Option<(BuyerIdentifier, String)>,
}

impl InvoiceBegin {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            copies: 1,
            buyer_lines: Vec::new(),
            buyer: None,
        }
    }

    pub fn copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    /// Buyer name or address line.
    pub fn buyer_line(mut self, text: impl Into<String>) -> Self {
        self.buyer_lines.push(text.into());
        self
    }

    pub fn buyer(mut self, kind: BuyerIdentifier, id: impl Into<String>) -> Self {
        let id = id.into();
        self.buyer = if id.is_empty() { None } else { Some((kind, id)) };
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(opcode::INVOICE_BEGIN)
            .param(self.copies.to_string())
            .param(";")
            .param(self.buyer_lines.len().to_string())
            .text(line(&self.number));
        for text in &self.buyer_lines {
            cmd.push_text(line(text));
        }

        if let Some((kind, id)) = &self.buyer {
            cmd.push_param(";");
            cmd.push_param(kind.code());
            cmd.push_text(line(id));
        }

        cmd
    }
}

/// # Close Invoice (`$e`)
///
/// The trailing `;1` invoice flag is not yet checked against a device.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceClose {
    inner: ReceiptClose,
}

impl InvoiceClose {
    pub fn new(total: f64, cashier: impl Into<String>) -> Self {
        Self {
            inner: ReceiptClose::new(total, cashier),
        }
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.inner = self.inner.discount(discount);
        self
    }

    pub fn cash(mut self, cash: f64) -> Self {
        self.inner = self.inner.cash(cash);
        self
    }

    pub fn command(&self) -> Command {
        let ReceiptClose {
            total,
            cashier,
            discount,
            cash,
        } = &self.inner;
        Command::new(opcode::DOCUMENT_END)
            .param("1;")
            .param_number(*discount)
            .param(";1")
            .text(line(cashier))
            .number(*cash)
            .text("/")
            .number(*total)
            .text("/")
    }
}

// ============================================================================
// NON-FISCAL PRINTOUTS
// ============================================================================

/// # Non-fiscal Printout (`$w`)
///
/// Layout not yet checked against a device.
///
/// Free text lines printed on a numbered non-fiscal form.
pub fn nonfiscal<S: AsRef<str>>(form: u32, lines: &[S]) -> Command {
    let mut cmd = Command::new(opcode::NONFISCAL)
        .param(form.to_string())
        .param(";")
        .param(lines.len().to_string());
    for text in lines {
        cmd.push_text(line(text.as_ref()));
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NovitusError;
    use crate::protocol::codepage::CodePage;

    #[test]
    fn test_item_minimal() {
        let cmd = Item::new(1, "Bułka", 3.0, "A", 0.5).command();
        assert_eq!(cmd.parameters(), &["1"]);
        assert_eq!(cmd.body(), "1$lBułka\r3.00/\rA/0.50//1.50//");
    }

    #[test]
    fn test_item_with_plu() {
        let cmd = Item::new(2, "Mleko", 1.0, "B", 3.29).plu("5901234").command();
        assert_eq!(cmd.body(), "2$lMleko\r5901234\r1.00/\rB/3.29//3.29//");
    }

    #[test]
    fn test_item_empty_plu_is_omitted() {
        let cmd = Item::new(1, "X", 1.0, "A", 1.0).plu("").command();
        assert_eq!(cmd.body(), "1$lX\r1.00/\rA/1.00//1.00//");
    }

    #[test]
    fn test_item_with_discount() {
        let cmd = Item::new(1, "Kawa", 2.0, "A", 10.0)
            .discount("Promocja", "10%")
            .command();
        assert_eq!(cmd.parameters(), &["1", "2;", "16"]);
        assert_eq!(cmd.body(), "12;16$lKawa\r2.00/\rA/10.00//20.00//10\rPromocja\r");
    }

    #[test]
    fn test_item_discount_description_id() {
        let cmd = Item::new(1, "Kawa", 1.0, "A", 10.0)
            .discount("Rabat", "1.50")
            .discount_description(3)
            .command();
        assert_eq!(cmd.parameters(), &["1", "2;", "3"]);
        assert!(cmd.body().ends_with("10.00//1.50\rRabat\r"));
    }

    #[test]
    fn test_item_discount_then_description_order() {
        let cmd = Item::new(4, "Herbata", 1.0, "A", 5.0)
            .description("zielona")
            .discount("Rabat", "5%")
            .command();
        // discount block always precedes the description block
        assert_eq!(cmd.parameters(), &["4", "2;", "16", "1;"]);
        assert_eq!(
            cmd.texts().last().map(String::as_str),
            Some("zielona\r")
        );
        assert_eq!(cmd.texts()[cmd.texts().len() - 2], "Rabat\r");
    }

    #[test]
    fn test_discount_and_markup_modes() {
        assert_eq!(discount("Rabat", "10%").body(), "1$nRabat\r10/");
        assert_eq!(discount("Rabat", "2.50").body(), "3$nRabat\r2.50/");
        assert_eq!(markup("Serwis", "5%").body(), "2$nSerwis\r5/");
        assert_eq!(markup("Serwis", "3.00").body(), "4$nSerwis\r3.00/");
    }

    #[test]
    fn test_payment() {
        let cmd = Payment::new(PaymentType::Card, 25.0).name("VISA").command();
        assert_eq!(cmd.body(), "1$bVISA\r25.00/");
        assert_eq!("transfer".parse::<PaymentType>(), Ok(PaymentType::Transfer));
        assert!("bitcoin".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_receipt_begin_plain() {
        assert_eq!(ReceiptBegin::new().command().body(), "0;0$h");
    }

    #[test]
    fn test_receipt_begin_lines_and_system_id() {
        let cmd = ReceiptBegin::new()
            .line("Stolik 4")
            .system_identifier("SYS-1")
            .command();
        assert_eq!(cmd.body(), "0;2$hSYS-1\rStolik 4\r");
    }

    #[test]
    fn test_receipt_begin_with_buyer() {
        let cmd = ReceiptBegin::new()
            .buyer(BuyerIdentifier::Nip, "1234567890")
            .command();
        assert_eq!(cmd.parameters(), &["0", ";", "0", ";0;", "1", ";", "1"]);
        assert_eq!(cmd.body(), "0;0;0;1;1$h1234567890\r");

        let cmd = ReceiptBegin::new()
            .buyer(BuyerIdentifier::Pesel, "")
            .command();
        assert_eq!(cmd.body(), "0;0$h");
    }

    #[test]
    fn test_receipt_cancel_and_close() {
        assert_eq!(receipt_cancel().body(), "0$e");
        let close = ReceiptClose::new(48.31, "Anna").discount(5.0).cash(50.0);
        assert_eq!(close.command().body(), "1;5$eAnna\r50.00//48.31//");
    }

    #[test]
    fn test_invoice() {
        let begin = InvoiceBegin::new("FV 12/2024")
            .copies(2)
            .buyer_line("ACME Sp. z o.o.")
            .buyer(BuyerIdentifier::Nip, "5250001009")
            .command();
        assert_eq!(begin.body(), "2;1;1$fFV 12/2024\rACME Sp. z o.o.\r5250001009\r");

        let close = InvoiceClose::new(100.0, "Anna").cash(100.0).command();
        assert_eq!(close.body(), "1;0;1$eAnna\r100.00//100.00//");
    }

    #[test]
    fn test_nonfiscal() {
        let cmd = nonfiscal(1, &["Zamówienie 7", "Dziękujemy"]);
        assert_eq!(cmd.body(), "1;2$wZamówienie 7\rDziękujemy\r");
    }

    #[test]
    fn test_buyer_identifier_parse() {
        assert_eq!("nip".parse::<BuyerIdentifier>(), Ok(BuyerIdentifier::Nip));
        assert_eq!(BuyerIdentifier::Regon.to_string(), "REGON");
    }

    #[test]
    fn test_non_finite_quantity_is_rejected() {
        let cmd = Item::new(1, "Kawa", f64::NAN, "A", 1.0).command();
        assert!(matches!(
            cmd.encode(CodePage::Mazovia),
            Err(NovitusError::InvalidToken(_))
        ));

        let close = ReceiptClose::new(10.0, "Jan").cash(f64::INFINITY).command();
        assert!(matches!(
            close.encode(CodePage::Mazovia),
            Err(NovitusError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_polish_item_encodes_in_both_code_pages() {
        let cmd = Item::new(1, "Żurek", 1.0, "A", 12.0).command();
        assert!(cmd.encode(CodePage::Mazovia).is_ok());
        assert!(cmd.encode(CodePage::Windows1250).is_ok());
    }
}
