/// Drops are the arms of the simulation: offers with a fixed lifetime and a limited stock.
/// A drop's index inside `Drops` is its identity for the whole run, it never changes even
/// after the drop sells out and leaves the eligible set.

/// Base conversion probabilities used for generated drops, cycled when more drops are needed
pub const BASE_P_CATALOG: [f64; 6] = [0.06, 0.10, 0.14, 0.08, 0.12, 0.05];

/// Stock given to each generated drop unless stated otherwise
pub const DEFAULT_STOCK: u64 = 120;

/// Default offer lifetime in seconds (15 minutes)
pub const DEFAULT_DURATION_S: u64 = 900;

#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    pub name: String,
    /// Intrinsic conversion probability, never revealed to the policies
    pub base_p: f64,
    pub stock: u64,
    pub initial_stock: u64,
    pub duration_s: u64,
    pub sold: u64,
    pub redemptions: u64,
}

impl Drop {
    pub fn new(name: String, base_p: f64, stock: u64, duration_s: u64) -> Self {
        Self {
            name,
            base_p,
            stock,
            initial_stock: stock,
            duration_s,
            sold: 0,
            redemptions: 0,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.stock > 0
    }

    /// Record one successful conversion: one unit leaves stock and is redeemed immediately
    /// Returns false (and changes nothing) if the drop is already sold out
    pub fn record_conversion(&mut self) -> bool {
        if self.stock == 0 {
            return false;
        }
        self.stock -= 1;
        self.sold += 1;
        self.redemptions += 1;
        true
    }
}

/// Run-scoped container for drops, addressed by stable index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drops {
    pub drops: Vec<Drop>,
}

impl Drops {
    pub fn new() -> Self {
        Self { drops: Vec::new() }
    }

    /// Add a drop to the collection and return its index
    ///
    /// # Arguments
    /// * `name` - Display name of the drop
    /// * `base_p` - Intrinsic conversion probability in [0, 1]
    /// * `stock` - Units available for the whole run
    /// * `duration_s` - Offer lifetime in seconds, used by the urgency model
    pub fn add(&mut self, name: String, base_p: f64, stock: u64, duration_s: u64) -> usize {
        let index = self.drops.len();
        self.drops.push(Drop::new(name, base_p, stock, duration_s));
        index
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Indices of drops that still have stock, in index order
    pub fn eligible_indices(&self) -> Vec<usize> {
        self.drops
            .iter()
            .enumerate()
            .filter(|(_, drop)| drop.is_eligible())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn total_sold(&self) -> u64 {
        self.drops.iter().map(|drop| drop.sold).sum()
    }

    pub fn total_initial_stock(&self) -> u64 {
        self.drops.iter().map(|drop| drop.initial_stock).sum()
    }
}

/// Build `k` drops named "Drop 1".."Drop k" with identical stock and duration and base
/// probabilities taken from `BASE_P_CATALOG` in order, wrapping around past its end
pub fn build_default_drops(k: usize, stock: u64, duration_s: u64) -> Drops {
    let mut drops = Drops::new();
    for i in 0..k {
        let base_p = BASE_P_CATALOG[i % BASE_P_CATALOG.len()];
        drops.add(format!("Drop {}", i + 1), base_p, stock, duration_s);
    }
    drops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_drops_take_catalog_prefix() {
        let drops = build_default_drops(3, 120, 900);
        let base_ps: Vec<f64> = drops.drops.iter().map(|d| d.base_p).collect();
        assert_eq!(base_ps, vec![0.06, 0.10, 0.14]);
        assert_eq!(drops.drops[0].name, "Drop 1");
        assert_eq!(drops.drops[2].name, "Drop 3");
        assert!(drops.drops.iter().all(|d| d.stock == 120 && d.duration_s == 900));
    }

    #[test]
    fn test_default_drops_cycle_catalog() {
        let drops = build_default_drops(8, 10, 60);
        assert_eq!(drops.len(), 8);
        assert_eq!(drops.drops[5].base_p, 0.05);
        assert_eq!(drops.drops[6].base_p, 0.06);
        assert_eq!(drops.drops[7].base_p, 0.10);
        assert_eq!(drops.drops[7].name, "Drop 8");
    }

    #[test]
    fn test_zero_drops_is_empty() {
        assert!(build_default_drops(0, 120, 900).is_empty());
    }

    #[test]
    fn test_record_conversion_conserves_stock() {
        let mut drop = Drop::new("Drop 1".to_string(), 0.1, 2, 900);
        assert!(drop.record_conversion());
        assert!(drop.record_conversion());
        assert!(!drop.record_conversion());
        assert_eq!(drop.stock, 0);
        assert_eq!(drop.sold, 2);
        assert_eq!(drop.redemptions, 2);
        assert_eq!(drop.sold + drop.stock, drop.initial_stock);
        assert!(!drop.is_eligible());
    }

    #[test]
    fn test_eligible_indices_keep_global_identity() {
        let mut drops = Drops::new();
        drops.add("A".to_string(), 0.1, 5, 900);
        drops.add("B".to_string(), 0.1, 0, 900);
        drops.add("C".to_string(), 0.1, 1, 900);
        assert_eq!(drops.eligible_indices(), vec![0, 2]);

        drops.drops[2].record_conversion();
        assert_eq!(drops.eligible_indices(), vec![0]);
        assert_eq!(drops.total_sold(), 1);
        assert_eq!(drops.total_initial_stock(), 6);
    }
}
