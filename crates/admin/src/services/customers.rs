//! Customers derived from orders.
//!
//! The storefront does not require an account to check out, so the
//! back-office builds its customer list from orders, keyed by phone number.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use mais_saude_core::{Phone, Price};
use mais_saude_core::catalog::Order;

/// One customer's purchase history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    /// Digits only; the grouping key.
    pub phone: String,
    /// Name given on the most recent order.
    pub name: String,
    /// Address given on the most recent order.
    pub address: Option<String>,
    pub last_order_at: DateTime<Utc>,
    pub order_count: usize,
    pub total_spent: Price,
    /// Newest first.
    pub orders: Vec<Order>,
}

impl CustomerSummary {
    fn start(phone: String, order: Order) -> Self {
        Self {
            phone,
            name: order.customer_name.clone(),
            address: order.customer_address.clone(),
            last_order_at: order.created_at,
            order_count: 1,
            total_spent: order.total_amount,
            orders: vec![order],
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.phone.contains(needle)
    }
}

/// Group orders by phone, richest customers first.
///
/// Orders are sorted newest first before grouping, so each customer's
/// name, address and last order date come from their latest order whatever
/// the input order. Ties on total spent fall back to the latest order date.
#[must_use]
pub fn aggregate_customers(mut orders: Vec<Order>) -> Vec<CustomerSummary> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<CustomerSummary> = Vec::new();

    for order in orders {
        let key = phone_key(&order.customer_phone);
        if let Some(customer) = index.get(&key).and_then(|&i| customers.get_mut(i))
        {
            customer.order_count += 1;
            customer.total_spent = customer.total_spent + order.total_amount;
            customer.orders.push(order);
        } else {
            index.insert(key.clone(), customers.len());
            customers.push(CustomerSummary::start(key, order));
        }
    }

    customers.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| b.last_order_at.cmp(&a.last_order_at))
    });
    customers
}

/// National digits of a stored phone, so `+55 (75) 99135-7869` and
/// `75991357869` land on the same customer. Unparseable values keep their
/// digits as-is.
fn phone_key(raw: &str) -> String {
    Phone::parse(raw).map_or_else(
        |_| raw.chars().filter(char::is_ascii_digit).collect(),
        |phone| phone.national().to_owned(),
    )
}

/// Keep customers whose name or phone contains `q` (case-insensitive).
///
/// Punctuation in `q` is ignored when matching phones, so `(75) 99135`
/// finds `7599135...`.
#[must_use]
pub fn filter_customers(customers: Vec<CustomerSummary>, q: Option<&str>) -> Vec<CustomerSummary> {
    let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
        return customers;
    };
    let needle = q.to_lowercase();
    let digits: String = q.chars().filter(char::is_ascii_digit).collect();

    customers
        .into_iter()
        .filter(|c| c.matches(&needle) || (!digits.is_empty() && c.phone.contains(&digits)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use mais_saude_core::{OrderId, OrderStatus};

    use super::*;

    fn order(phone: &str, name: &str, cents: u32, day: u32) -> Order {
        Order {
            id: OrderId::generate(),
            created_at: Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap(),
            customer_name: name.to_owned(),
            customer_phone: phone.to_owned(),
            customer_address: Some(format!("Rua {day}")),
            total_amount: Price::from_cents(cents),
            status: OrderStatus::Pending,
            payment_method: "whatsapp".to_owned(),
            notes: None,
        }
    }

    #[test]
    fn test_groups_by_phone_with_latest_details() {
        let orders = vec![
            order("75991357869", "Maria", 1000, 1),
            order("75991357869", "Maria Souza", 2500, 5),
            order("75988887777", "João", 1500, 3),
        ];

        let customers = aggregate_customers(orders);

        assert_eq!(customers.len(), 2);
        let maria = &customers[0];
        assert_eq!(maria.phone, "75991357869");
        assert_eq!(maria.name, "Maria Souza");
        assert_eq!(maria.address.as_deref(), Some("Rua 5"));
        assert_eq!(maria.order_count, 2);
        assert_eq!(maria.total_spent, Price::from_cents(3500));
        assert_eq!(maria.orders[0].total_amount, Price::from_cents(2500));
        assert_eq!(customers[1].name, "João");
    }

    #[test]
    fn test_formatted_and_plain_phones_are_one_customer() {
        let customers = aggregate_customers(vec![
            order("(75) 99135-7869", "Maria", 1000, 1),
            order("75991357869", "Maria", 2000, 2),
            order("+55 75 99135-7869", "Maria Souza", 500, 3),
        ]);

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].phone, "75991357869");
        assert_eq!(customers[0].order_count, 3);
        assert_eq!(customers[0].total_spent, Price::from_cents(3500));
        assert_eq!(filter_customers(customers, Some("7599135")).len(), 1);
    }

    #[test]
    fn test_sorted_by_total_spent() {
        let orders = vec![
            order("1", "Pouco", 100, 9),
            order("2", "Muito", 90_000, 1),
            order("3", "Médio", 5_000, 2),
        ];
        let names: Vec<String> = aggregate_customers(orders)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Muito", "Médio", "Pouco"]);
    }

    #[test]
    fn test_empty() {
        assert!(aggregate_customers(Vec::new()).is_empty());
    }

    #[test]
    fn test_filter_by_name_or_phone() {
        let customers = aggregate_customers(vec![
            order("75991357869", "Maria", 1000, 1),
            order("75988887777", "João", 1500, 3),
        ]);

        let by_name = filter_customers(customers.clone(), Some("MAR"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Maria");

        let by_phone = filter_customers(customers.clone(), Some("(75) 98888"));
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "João");

        assert_eq!(filter_customers(customers, Some("  ")).len(), 2);
    }
}
