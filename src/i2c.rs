use rppal::i2c::I2c;

pub trait I2CBit {
    fn ecriture_word(&mut self, commande: u8, donnee: u8) -> anyhow::Result<()>;
    fn lecture_word(&mut self, commande: u8) -> anyhow::Result<u8>;
}

impl I2CBit for I2c {
    /// Ecrit un octet (word) sur la position donnée d'un registre 8 bits
    fn ecriture_word(&mut self, commande: u8, donnee: u8) -> anyhow::Result<()> {
        let buffer: &[u8] = &[donnee];
        self.block_write(commande, buffer)?;
        Ok(())
    }

    /// Lecture d'un octet (word) sur la position donnée d'un registre 8 bits
    fn lecture_word(&mut self, commande: u8) -> anyhow::Result<u8> {
        let buffer: &mut [u8] = &mut [0];
        self.block_read(commande, buffer)?;
        Ok(buffer[0])
    }
}
