use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisMode};
use zkwarp_circuit::{
    commitment_tree::CommitmentTree, compute_nullifier, evaluate_witness, CircuitPublic,
    CircuitWitness, ConstraintViolation, ThresholdCircuit, PUBLIC_SIGNAL_COUNT,
};

const BASE_AMOUNT: u64 = 5_000_000_000_000_000_000;
const BASE_MIN: u64 = 1_000_000_000_000_000_000;
const OTHER_AMOUNTS: [u64; 3] = [2_000_000_000_000_000_000, 42, 777_000];
const SEED: u64 = 0xDEAD_BEEF;

struct FixtureBuilder {
    witness: CircuitWitness,
    public: CircuitPublic,
}

impl FixtureBuilder {
    fn new() -> Self {
        let seed = Fr::from(SEED);
        let mut leaves = vec![Fr::from(BASE_AMOUNT)];
        leaves.extend(OTHER_AMOUNTS.iter().map(|a| Fr::from(*a)));
        let tree = CommitmentTree::new(&leaves).expect("fixture tree");
        let path = tree.path(0).expect("fixture path");

        let witness = CircuitWitness {
            amount_raw: BASE_AMOUNT,
            seed,
            path_elements: path.elements,
            path_indices: path.indices,
        };
        let public = CircuitPublic {
            min_amount: BASE_MIN,
            merkle_root: tree.root(),
            nullifier: compute_nullifier(seed, BASE_AMOUNT),
        };
        Self { witness, public }
    }

    fn with_witness(mut self, f: impl FnOnce(&mut CircuitWitness)) -> Self {
        f(&mut self.witness);
        self
    }

    fn with_public(mut self, f: impl FnOnce(&mut CircuitPublic)) -> Self {
        f(&mut self.public);
        self
    }

    fn build(self) -> ThresholdCircuit {
        ThresholdCircuit::new(self.witness, self.public)
    }
}

fn is_satisfied(circuit: ThresholdCircuit) -> bool {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).expect("synthesis");
    cs.is_satisfied().expect("satisfiability check")
}

#[test]
fn valid_witness_satisfies_circuit() {
    assert!(is_satisfied(FixtureBuilder::new().build()));
}

#[test]
fn amount_below_minimum_is_unsatisfiable() {
    let circuit = FixtureBuilder::new()
        .with_public(|public| public.min_amount = BASE_AMOUNT + 1)
        .build();
    assert!(!is_satisfied(circuit));
}

#[test]
fn wrong_merkle_root_is_unsatisfiable() {
    let circuit = FixtureBuilder::new()
        .with_public(|public| public.merkle_root += Fr::from(1u64))
        .build();
    assert!(!is_satisfied(circuit));
}

#[test]
fn wrong_nullifier_is_unsatisfiable() {
    let circuit = FixtureBuilder::new()
        .with_public(|public| public.nullifier += Fr::from(1u64))
        .build();
    assert!(!is_satisfied(circuit));
}

#[test]
fn tampered_path_sibling_is_unsatisfiable() {
    let circuit = FixtureBuilder::new()
        .with_witness(|witness| witness.path_elements[3] += Fr::from(1u64))
        .build();
    assert!(!is_satisfied(circuit));
}

#[test]
fn flipped_path_bit_is_unsatisfiable() {
    let circuit = FixtureBuilder::new()
        .with_witness(|witness| witness.path_indices[0] = !witness.path_indices[0])
        .build();
    assert!(!is_satisfied(circuit));
}

#[test]
fn circuit_exposes_three_public_signals() {
    let cs = ConstraintSystem::<Fr>::new_ref();
    FixtureBuilder::new()
        .build()
        .generate_constraints(cs.clone())
        .expect("synthesis");
    // plus the constant-one instance variable
    assert_eq!(cs.num_instance_variables(), PUBLIC_SIGNAL_COUNT + 1);
}

#[test]
fn blank_circuit_synthesizes_for_keygen() {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    ThresholdCircuit::blank()
        .generate_constraints(cs.clone())
        .expect("keygen synthesis");
    assert_eq!(cs.num_instance_variables(), PUBLIC_SIGNAL_COUNT + 1);
}

#[test]
fn native_evaluation_reports_threshold_violation() {
    let fixture = FixtureBuilder::new().with_public(|public| public.min_amount = BASE_AMOUNT + 1);
    assert_eq!(
        evaluate_witness(&fixture.witness, &fixture.public),
        Err(ConstraintViolation::ThresholdViolation)
    );
}

#[test]
fn native_evaluation_reports_invalid_membership() {
    let fixture =
        FixtureBuilder::new().with_public(|public| public.merkle_root += Fr::from(1u64));
    assert_eq!(
        evaluate_witness(&fixture.witness, &fixture.public),
        Err(ConstraintViolation::InvalidMembership)
    );
}

#[test]
fn native_evaluation_reports_nullifier_mismatch() {
    let fixture = FixtureBuilder::new().with_public(|public| public.nullifier += Fr::from(1u64));
    assert_eq!(
        evaluate_witness(&fixture.witness, &fixture.public),
        Err(ConstraintViolation::NullifierMismatch)
    );
}

#[test]
fn native_evaluation_accepts_valid_witness() {
    let fixture = FixtureBuilder::new();
    assert_eq!(evaluate_witness(&fixture.witness, &fixture.public), Ok(()));
}
