//! Address resolution. Ports are globally unique in this stack, so a port
//! alone identifies an endpoint and maps to exactly one network address.

/// Per-node resolution tables: network address to data-link address, and
/// port to network address.
pub struct AddressBook {
    links: Vec<(u8, u32)>,
    ports: Vec<(u8, u8)>,
}

pub struct AddressBookBuilder {
    /// `(network address, data-link address)` pairs.
    pub links: Vec<(u8, u32)>,
    /// `(port, network address)` pairs.
    pub ports: Vec<(u8, u8)>,
}

impl AddressBookBuilder {
    pub fn build(self) -> Result<AddressBook, BuildError> {
        for (i, (net, _)) in self.links.iter().enumerate() {
            if self.links[..i].iter().any(|(other, _)| other == net) {
                return Err(BuildError::DuplicateNetAddr { net_addr: *net });
            }
        }
        for (i, (port, _)) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|(other, _)| other == port) {
                return Err(BuildError::DuplicatePort { port: *port });
            }
        }
        Ok(AddressBook {
            links: self.links,
            ports: self.ports,
        })
    }
}

#[derive(Debug)]
pub enum BuildError {
    DuplicateNetAddr { net_addr: u8 },
    DuplicatePort { port: u8 },
}

impl AddressBook {
    #[must_use]
    pub fn resolve_dl_addr(&self, net_addr: u8) -> Option<u32> {
        self.links
            .iter()
            .find(|(net, _)| *net == net_addr)
            .map(|(_, dl)| *dl)
    }

    #[must_use]
    pub fn resolve_net_addr(&self, port: u8) -> Option<u8> {
        self.ports
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, net)| *net)
    }
}

/// Static next-hop table. A destination absent from the table has no route;
/// the network layer turns that into a transmit error.
pub struct RouteTable {
    hops: Vec<(u8, u8)>,
}

pub struct RouteTableBuilder {
    /// `(final destination, next hop)` pairs.
    pub hops: Vec<(u8, u8)>,
}

impl RouteTableBuilder {
    pub fn build(self) -> Result<RouteTable, BuildError> {
        for (i, (dest, _)) in self.hops.iter().enumerate() {
            if self.hops[..i].iter().any(|(other, _)| other == dest) {
                return Err(BuildError::DuplicateNetAddr { net_addr: *dest });
            }
        }
        Ok(RouteTable { hops: self.hops })
    }
}

impl RouteTable {
    #[must_use]
    pub fn next_hop(&self, final_addr: u8) -> Option<u8> {
        self.hops
            .iter()
            .find(|(dest, _)| *dest == final_addr)
            .map(|(_, hop)| *hop)
    }
}
