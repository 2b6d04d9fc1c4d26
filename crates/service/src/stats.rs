//! Aggregates over catalogue listings.

use std::collections::BTreeMap;

use models::{category::Category, listing::Listing, round_money};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub count: usize,
    pub average_price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub total: usize,
    pub active: usize,
    pub popular: usize,
    pub average_price: f64,
    pub average_rating: f64,
    pub by_category: BTreeMap<Category, CategoryStats>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryInfo {
    pub id: Category,
    pub name: &'static str,
    pub count: usize,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { round_money(sum / n as f64) }
}

pub fn service_stats<T: Listing>(items: &[T]) -> ServiceStats {
    let mut grouped: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for s in items {
        grouped.entry(s.category()).or_default().push(s.price());
    }
    let rated: Vec<f64> = items.iter().map(|s| s.rating()).filter(|r| r.count > 0).map(|r| r.average).collect();
    ServiceStats {
        total: items.len(),
        active: items.iter().filter(|s| s.is_active()).count(),
        popular: items.iter().filter(|s| s.is_popular()).count(),
        average_price: mean(items.iter().map(|s| s.price())),
        average_rating: mean(rated.into_iter()),
        by_category: grouped
            .into_iter()
            .map(|(c, prices)| (c, CategoryStats { count: prices.len(), average_price: mean(prices.into_iter()) }))
            .collect(),
    }
}

/// Every known category with the number of active listings in it.
pub fn categories<T: Listing>(items: &[T]) -> Vec<CategoryInfo> {
    Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            id: *c,
            name: c.label(),
            count: items.iter().filter(|s| s.is_active() && s.category() == *c).count(),
        })
        .collect()
}

/// Active popular listings, best rated first.
pub fn popular<T: Listing>(items: Vec<T>, limit: usize) -> Vec<T> {
    let mut out: Vec<T> = items.into_iter().filter(|s| s.is_active() && s.is_popular()).collect();
    out.sort_by(|a, b| {
        b.rating()
            .average
            .total_cmp(&a.rating().average)
            .then_with(|| b.rating().count.cmp(&a.rating().count))
    });
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::{rating::Rating, service::{Service, ServiceDraft}, Document};

    fn service(category: &str, price: f64, rating: Rating, bookings: u32) -> Service {
        let mut s = ServiceDraft {
            title: format!("{category} job"),
            description: String::new(),
            category: category.into(),
            price,
            duration: 45,
            images: vec![],
            tags: vec![],
            provider_id: None,
            is_active: None,
        }
        .into_service(Utc::now())
        .unwrap();
        s.rating = rating;
        s.booking_count = bookings;
        s.before_save().unwrap();
        s
    }

    #[test]
    fn stats_group_by_category() {
        let items = vec![
            service("plumbing", 100.0, Rating { average: 4.8, count: 20 }, 12),
            service("plumbing", 300.0, Rating::default(), 0),
            service("painting", 50.0, Rating { average: 4.0, count: 2 }, 1),
        ];
        let stats = service_stats(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.popular, 1);
        assert_eq!(stats.average_price, 150.0);
        assert_eq!(stats.average_rating, 4.4);
        assert_eq!(stats.by_category[&Category::Plumbing], CategoryStats { count: 2, average_price: 200.0 });
    }

    #[test]
    fn popular_sorted_by_rating() {
        let items = vec![
            service("cleaning", 10.0, Rating { average: 4.6, count: 5 }, 10),
            service("moving", 10.0, Rating { average: 4.9, count: 5 }, 10),
            service("hvac", 10.0, Rating { average: 3.0, count: 5 }, 50),
        ];
        let top = popular(items, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, Category::Moving);
    }

    #[test]
    fn categories_list_every_kind() {
        let cats = categories::<Service>(&[]);
        assert_eq!(cats.len(), Category::ALL.len());
        assert!(cats.iter().all(|c| c.count == 0));
    }
}
