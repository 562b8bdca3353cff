use sahap::model::{Read, Site};
use sahap::haplotype::Haplotype;

/// Two fully-disagreeing reads either split cleanly (total_cost 0) or
/// collide into one haplotype (total_cost = M, one dissenting unit weight at
/// every site).
#[test]
fn disjoint_haplotypes_have_zero_cost_shared_haplotype_carries_full_mec() {
    let r1 = Read::new(vec![
        Site::new(0, 0, 1.0),
        Site::new(1, 0, 1.0),
        Site::new(2, 0, 1.0),
        Site::new(3, 0, 1.0),
    ]);
    let r2 = Read::new(vec![
        Site::new(0, 1, 1.0),
        Site::new(1, 1, 1.0),
        Site::new(2, 1, 1.0),
        Site::new(3, 1, 1.0),
    ]);

    let mut split_a = Haplotype::new(4, 2, 0.015);
    let mut split_b = Haplotype::new(4, 2, 0.015);
    split_a.add_read(0, &r1).unwrap();
    split_b.add_read(1, &r2).unwrap();
    assert_eq!(split_a.total_cost(), 0.0);
    assert_eq!(split_b.total_cost(), 0.0);

    let mut shared = Haplotype::new(4, 2, 0.015);
    shared.add_read(0, &r1).unwrap();
    shared.add_read(1, &r2).unwrap();
    assert_eq!(shared.total_cost(), 4.0);
    for site in 0..4 {
        assert_eq!(shared.coverage_at(site), 2);
    }
}

/// Add four reads split across two haplotypes, then remove one; the vacated
/// site returns to the empty-coverage state with an undefined consensus and
/// zero cost.
#[test]
fn removing_the_sole_read_at_a_site_clears_its_state() {
    let r1 = Read::new(vec![Site::new(0, 0, 1.0)]);
    let r2 = Read::new(vec![Site::new(0, 1, 1.0)]);
    let r3 = Read::new(vec![Site::new(1, 0, 1.0)]);
    let r4 = Read::new(vec![Site::new(1, 1, 1.0)]);

    let mut h0 = Haplotype::new(2, 2, 0.015);
    let mut h1 = Haplotype::new(2, 2, 0.015);

    h0.add_read(0, &r1).unwrap();
    h1.add_read(1, &r2).unwrap();
    h0.add_read(2, &r3).unwrap();
    h1.add_read(3, &r4).unwrap();

    h0.remove_read(0, &r1).unwrap();

    assert_eq!(h0.coverage_at(0), 0);
    assert_eq!(h0.solution()[0], None);
    assert_eq!(h0.total_cost(), 0.0);
    assert_eq!(h1.total_cost(), 0.0);
}

#[test]
fn add_then_remove_round_trips_to_the_empty_state() {
    let r = Read::new(vec![Site::new(0, 0, 0.7), Site::new(1, 1, 0.4), Site::new(2, 0, 1.0)]);
    let mut h = Haplotype::new(3, 2, 0.015);

    h.add_read(0, &r).unwrap();
    assert!(h.num_reads() == 1);
    h.remove_read(0, &r).unwrap();

    assert_eq!(h.num_reads(), 0);
    assert_eq!(h.total_cost(), 0.0);
    assert_eq!(h.site_cost(), 0.0);
    for site in 0..3 {
        assert_eq!(h.coverage_at(site), 0);
        assert_eq!(h.solution()[site], None);
    }
}

#[test]
fn empty_haplotype_rejects_remove_and_accepts_add() {
    let r = Read::new(vec![Site::new(0, 0, 1.0)]);
    let mut h = Haplotype::new(1, 2, 0.015);
    assert_eq!(h.num_reads(), 0);
    assert_eq!(h.total_cost(), 0.0);
    assert!(h.remove_read(0, &r).is_err());
    assert!(h.add_read(0, &r).is_ok());
}
