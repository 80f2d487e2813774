use coppice::Vector;
use rand::rngs::ThreadRng;
use rand::Rng;

#[test]
fn random_edits_match_a_vec_model() {
    const OPS: usize = 2_000;
    let mut rng = ThreadRng::default();
    let mut ours: Vector<u64> = Vector::new();
    let mut model: Vec<u64> = Vec::new();
    for _ in 0..OPS {
        match rng.gen_range(0..5) {
            0 => {
                let v = rng.gen();
                ours.push_back(v);
                model.push(v);
            }
            1 => {
                assert_eq!(ours.pop_back(), model.pop());
            }
            2 if !model.is_empty() => {
                let i = rng.gen_range(0..model.len());
                let v = rng.gen();
                ours.set(i, v);
                model[i] = v;
            }
            3 => {
                let i = rng.gen_range(0..=model.len());
                let v = rng.gen();
                ours.insert(i, v);
                model.insert(i, v);
            }
            4 if !model.is_empty() => {
                let i = rng.gen_range(0..model.len());
                assert_eq!(ours.remove(i), model.remove(i));
            }
            _ => {}
        }
        assert_eq!(ours.len(), model.len());
    }
    assert!(ours.iter().eq(model.iter()));
}
