use std::cell::Cell;
use std::rc::Rc;

/**
A value that counts how many times it has been dropped.
 */
pub(crate) struct Probe {
    drops: Rc<Cell<usize>>,
    pub(crate) id: u32,
}

impl Probe {
    pub(crate) fn new(id: u32) -> (Self, Rc<Cell<usize>>) {
        let drops = Rc::new(Cell::new(0));

        (
            Probe {
                drops: drops.clone(),
                id,
            },
            drops,
        )
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}
