use super::*;

#[test]
fn reference_is_alive_while_token_lives() {
    let token = ThreadToken::new();
    let reference = token.downgrade();
    assert!(reference.is_alive());
    drop(token);
    assert!(!reference.is_alive());
}

#[test]
fn reference_identifies_its_own_token() {
    let a = ThreadToken::new();
    let b = ThreadToken::new();
    let a_ref = a.downgrade();
    assert!(a_ref.is(&a));
    assert!(!a_ref.is(&b));
}

#[test]
fn dies_across_real_thread_unwind() {
    let (tx, rx) = std::sync::mpsc::channel();
    let handle = std::thread::spawn(move || {
        let token = ThreadToken::new();
        tx.send(token.downgrade()).unwrap();
        // token drops here at end of scope, simulating the loader returning.
    });
    let reference = rx.recv().unwrap();
    handle.join().unwrap();
    assert!(!reference.is_alive());
}
